//! Concurrent readers against cold and redeployed processes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use bpmn_meta::host::{
    Bpmn2DataService, DefinitionSource, DeployedDefinition, ProcessDataService,
};

use crate::helpers::source_fixtures::{APPROVAL, ORDER_FULFILMENT, deployable};

const READERS: usize = 16;

/// Source that counts how often each definition is fetched.
struct CountingSource {
    fetches: AtomicUsize,
}

impl DefinitionSource for CountingSource {
    fn definition(&self, process_id: &str) -> Option<DeployedDefinition> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        deployable()
            .into_iter()
            .find(|(id, _)| *id == process_id)
            .map(|(_, text)| DeployedDefinition::new("kb", text))
    }
}

#[test]
fn test_cold_readers_share_one_build() {
    let source = Arc::new(CountingSource {
        fetches: AtomicUsize::new(0),
    });
    let service = Arc::new(ProcessDataService::new().with_source(source.clone()));
    let barrier = Arc::new(Barrier::new(READERS));

    let handles: Vec<_> = (0..READERS)
        .map(|_| {
            let service = service.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let desc = service.process_desc("orders.fulfilment").unwrap();
                let forms = service.associated_forms("orders.fulfilment");
                (desc, forms)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let (first_desc, _) = &results[0];
    for (desc, forms) in &results {
        assert_eq!(desc, first_desc);
        assert_eq!(&desc.forms, forms);
        assert_eq!(desc.tasks.len(), 3);
    }
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(service.cache().len(), 1);
}

#[test]
fn test_readers_never_see_torn_entries_during_redeploy() {
    let service = Arc::new(ProcessDataService::new());
    service.deploy("kb", ORDER_FULFILMENT.as_str()).unwrap();
    let renamed = ORDER_FULFILMENT.replace("name=\"Inspect\"", "name=\"Examine\"");

    let writer = {
        let service = service.clone();
        thread::spawn(move || {
            for round in 0..50 {
                let text = if round % 2 == 0 {
                    renamed.as_str()
                } else {
                    ORDER_FULFILMENT.as_str()
                };
                service.deploy("kb", text).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let service = service.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let entry = service.cache().get("orders.fulfilment").unwrap();
                    let names: Vec<_> = entry.model.tasks.keys().cloned().collect();
                    assert_eq!(entry.views.descriptor.tasks, names);
                    assert!(entry.views.forms.contains(&"inspection".to_string()));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

/// Source that parks every fetch until the test releases it.
struct GatedSource {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl DefinitionSource for GatedSource {
    fn definition(&self, _process_id: &str) -> Option<DeployedDefinition> {
        self.entered.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        Some(DeployedDefinition::new("kb", APPROVAL.as_str()))
    }
}

#[test]
fn test_undeploy_discards_build_in_flight() {
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let source = Arc::new(GatedSource {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let service = Arc::new(ProcessDataService::new().with_source(source));

    let reader = {
        let service = service.clone();
        thread::spawn(move || service.process_desc("approval"))
    };

    // The reader holds the build lock and waits inside the source
    entered_rx.recv().unwrap();
    assert!(!service.undeploy("approval"));
    release_tx.send(()).unwrap();

    let in_flight = reader.join().unwrap();
    assert!(in_flight.unwrap_err().is_not_found());
    assert!(service.process_desc("approval").unwrap_err().is_not_found());
    assert!(service.cache().is_empty());
}
