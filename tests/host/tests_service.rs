//! Query surface behaviour of `ProcessDataService`.

use bpmn_meta::hir::{MappingDirection, TaskKind};
use bpmn_meta::host::{Bpmn2DataService, ProcessDataService};
use rstest::rstest;

use crate::helpers::service_helpers::{deployed_service, lazy_service};
use crate::helpers::source_fixtures::{APPROVAL, ORDER_FULFILMENT, deployable};

// ============================================================================
// FULL DOCUMENT
// ============================================================================

#[test]
fn test_fulfilment_process_data_and_entities() {
    let service = deployed_service();
    let data = service.process_data("orders.fulfilment");
    let pairs: Vec<_> = data.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(
        pairs,
        vec![
            ("order", "org.acme.Order"),
            ("approved", "java.lang.Boolean"),
            ("note", "java.lang.Object"),
        ]
    );

    let entities = service.associated_entities("orders.fulfilment");
    assert_eq!(entities.len(), 1);
    assert_eq!(entities["order"], "jpa");

    assert_eq!(
        service.associated_domain_objects("orders.fulfilment"),
        vec!["org.acme.Order", "java.lang.Boolean"]
    );
}

#[test]
fn test_fulfilment_tasks() {
    let service = deployed_service();
    let tasks = service.all_task_defs("orders.fulfilment");
    let names: Vec<_> = tasks.iter().map(|t| (t.name.as_str(), t.kind)).collect();
    assert_eq!(
        names,
        vec![
            ("Check order", TaskKind::User),
            ("Ship", TaskKind::Service),
            ("Inspect", TaskKind::User),
        ]
    );

    let check = &tasks[0];
    assert_eq!(check.priority, 5);
    assert!(check.skippable);
    assert_eq!(check.form_name.as_deref(), Some("Check order-taskform"));
    assert_eq!(tasks[2].form_name.as_deref(), Some("inspection"));
    assert_eq!(tasks[1].form_name, None);

    assert_eq!(
        service.associated_forms("orders.fulfilment"),
        vec!["Check order-taskform", "inspection"]
    );
}

#[test]
fn test_fulfilment_mappings_and_calls() {
    let service = deployed_service();
    let inputs = service.task_input_mappings("orders.fulfilment", "Check order");
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs["in_order"], "order");

    let outputs = service.task_output_mappings("orders.fulfilment", "Check order");
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs["approved"], "out_ok");

    let calls: Vec<_> = service
        .reusable_subprocesses("orders.fulfilment")
        .into_iter()
        .collect();
    assert_eq!(calls, vec!["orders.refund", "orders.invoice"]);

    let services = service.all_service_tasks("orders.fulfilment");
    assert_eq!(services.len(), 1);
    assert_eq!(services["Ship"], "org.acme.ShippingService");
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn test_pipeline_is_idempotent() {
    let first = deployed_service();
    let second = deployed_service();
    for (id, _) in deployable() {
        let a = first.cache().get(id).unwrap();
        let b = second.cache().get(id).unwrap();
        assert_eq!(a.model, b.model);
        assert_eq!(a.views, b.views);
    }
}

#[test]
fn test_descriptor_agrees_with_getters() {
    let service = deployed_service();
    for (id, _) in deployable() {
        let desc = service.process_desc(id).unwrap();
        assert_eq!(desc.id, id);
        assert_eq!(desc.deployment_id, "kb");
        assert_eq!(desc.forms, service.associated_forms(id));
        assert_eq!(desc.entities, service.associated_entities(id));
        assert_eq!(desc.domain_objects, service.associated_domain_objects(id));
        assert_eq!(
            desc.reusable_subprocesses,
            service.reusable_subprocesses(id).into_iter().collect::<Vec<_>>()
        );

        let variables: Vec<_> = desc
            .variables
            .iter()
            .map(|v| (v.name.clone(), v.type_name.clone()))
            .collect();
        let data: Vec<_> = service.process_data(id).into_iter().collect();
        assert_eq!(variables, data);

        let services: Vec<_> = desc
            .service_tasks
            .iter()
            .map(|s| (s.task_name.clone(), s.implementation.clone()))
            .collect();
        let getter: Vec<_> = service.all_service_tasks(id).into_iter().collect();
        assert_eq!(services, getter);

        let names: Vec<_> = service
            .all_task_defs(id)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(desc.tasks, names);
    }
}

#[test]
fn test_task_names_are_unique() {
    let service = deployed_service();
    for (id, _) in deployable() {
        let mut names: Vec<_> = service
            .all_task_defs(id)
            .into_iter()
            .map(|t| t.name)
            .collect();
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count, "duplicate task names in {id}");
    }
}

#[test]
fn test_mappings_belong_to_their_task() {
    let service = deployed_service();
    let entry = service.cache().get("orders.fulfilment").unwrap();
    for task in service.all_task_defs("orders.fulfilment") {
        let inputs = service.task_input_mappings("orders.fulfilment", &task.name);
        let outputs = service.task_output_mappings("orders.fulfilment", &task.name);

        let owned = |direction: MappingDirection, target: &String, source: &String| {
            entry.model.mappings().any(|m| {
                m.task == task.name
                    && m.direction == direction
                    && &m.target == target
                    && &m.source == source
            })
        };
        for (target, source) in &inputs {
            assert!(owned(MappingDirection::Input, target, source));
        }
        for (target, source) in &outputs {
            assert!(owned(MappingDirection::Output, target, source));
        }
    }
}

#[rstest]
#[case::deployed(deployed_service())]
#[case::lazy(lazy_service().0)]
#[case::empty(ProcessDataService::new())]
fn test_unknown_process_is_total(#[case] service: ProcessDataService) {
    let id = "never.deployed";
    assert!(service.associated_entities(id).is_empty());
    assert!(service.associated_domain_objects(id).is_empty());
    assert!(service.process_data(id).is_empty());
    assert!(service.associated_forms(id).is_empty());
    assert!(service.all_task_defs(id).is_empty());
    assert!(service.task_input_mappings(id, "Approve").is_empty());
    assert!(service.task_output_mappings(id, "Approve").is_empty());
    assert!(service.reusable_subprocesses(id).is_empty());
    assert!(service.all_service_tasks(id).is_empty());
    assert!(service.process_desc(id).unwrap_err().is_not_found());
}

// ============================================================================
// DEPLOYMENT
// ============================================================================

#[test]
fn test_lazy_and_deployed_views_match() {
    let deployed = deployed_service();
    let (lazy, _source) = lazy_service();
    for (id, _) in deployable() {
        assert_eq!(lazy.process_desc(id), deployed.process_desc(id));
    }
}

#[test]
fn test_redeploy_replaces_views() {
    let service = deployed_service();
    let before = service.cache().get("orders.fulfilment").unwrap();

    let renamed = ORDER_FULFILMENT.replace("name=\"Inspect\"", "name=\"Examine\"");
    service.deploy("kb-2", renamed).unwrap();

    let after = service.process_desc("orders.fulfilment").unwrap();
    assert_eq!(after.deployment_id, "kb-2");
    assert!(after.tasks.contains(&"Examine".to_string()));
    // A reader holding the old entry keeps its snapshot
    assert!(before.views.descriptor.tasks.contains(&"Inspect".to_string()));
}

#[test]
fn test_undeploy_is_not_undone_by_source() {
    let (service, source) = lazy_service();
    assert!(!service.associated_forms("approval").is_empty());

    // The source still holds the content
    assert!(service.undeploy("approval"));
    assert!(service.associated_forms("approval").is_empty());
    assert!(service.process_desc("approval").unwrap_err().is_not_found());

    // Other processes from the same source stay reachable
    assert!(service.process_desc("caller").is_ok());
    assert_eq!(source.len(), deployable().len());

    service.deploy("kb", APPROVAL.as_str()).unwrap();
    assert!(!service.associated_forms("approval").is_empty());
}
