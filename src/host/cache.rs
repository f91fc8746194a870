//! Copy-on-write cache of built process models.
//!
//! Entries are published as `Arc<CacheEntry>` and never mutated afterwards.
//! A reader that cloned an entry keeps a consistent snapshot even while a
//! newer generation replaces it. The map's read guard is only held for the
//! duration of one `Arc` clone.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::hir::{ProcessModel, ProcessViews};

/// A built model plus its precomputed views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Publication order; assigned by the cache.
    pub generation: u64,
    pub model: Arc<ProcessModel>,
    pub views: ProcessViews,
    pub deployment_id: Arc<str>,
}

impl CacheEntry {
    /// Project the views of `model`. The generation is set on publication.
    pub fn new(model: Arc<ProcessModel>, deployment_id: impl Into<Arc<str>>) -> Self {
        let deployment_id = deployment_id.into();
        let views = ProcessViews::project(&model, &deployment_id);
        Self {
            generation: 0,
            model,
            views,
            deployment_id,
        }
    }

    pub fn process_id(&self) -> &str {
        &self.model.id
    }
}

/// Live entries plus the ids retired by an undeploy.
///
/// Both live under one lock so that retiring an id and a lazy publication
/// for it cannot interleave.
#[derive(Default)]
struct Slots {
    live: FxHashMap<Arc<str>, Arc<CacheEntry>>,
    retired: FxHashSet<Arc<str>>,
}

/// Process id → latest published entry.
#[derive(Default)]
pub struct DescriptorCache {
    slots: RwLock<Slots>,
    generation: AtomicU64,
    build_locks: Mutex<FxHashMap<Arc<str>, Arc<Mutex<()>>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, process_id: &str) -> Option<Arc<CacheEntry>> {
        let entry = self.slots.read().live.get(process_id).cloned();
        if let Some(entry) = &entry {
            trace!(process = process_id, generation = entry.generation, "cache hit");
        }
        entry
    }

    /// Publish `entry`, replacing any previous one for the same process.
    ///
    /// An explicit publication also lifts a retirement.
    pub fn put(&self, mut entry: CacheEntry) -> Arc<CacheEntry> {
        let mut slots = self.slots.write();
        entry.generation = self.bump();
        let entry = Arc::new(entry);
        slots.retired.remove(entry.process_id());
        slots.live.insert(Arc::from(entry.process_id()), entry.clone());
        debug!(
            process = entry.process_id(),
            generation = entry.generation,
            "published cache entry"
        );
        entry
    }

    /// Publish `entry` unless one already exists; returns whichever is cached.
    ///
    /// Returns `None` without publishing when the id has been retired.
    pub fn put_if_absent(&self, mut entry: CacheEntry) -> Option<Arc<CacheEntry>> {
        let mut slots = self.slots.write();
        if slots.retired.contains(entry.process_id()) {
            debug!(process = entry.process_id(), "dropped build of retired process");
            return None;
        }
        if let Some(existing) = slots.live.get(entry.process_id()) {
            return Some(existing.clone());
        }
        entry.generation = self.bump();
        let entry = Arc::new(entry);
        slots.live.insert(Arc::from(entry.process_id()), entry.clone());
        debug!(
            process = entry.process_id(),
            generation = entry.generation,
            "published lazily built entry"
        );
        Some(entry)
    }

    /// Remove the entry for `process_id`, returning it if there was one.
    ///
    /// A later lazy build may publish the id again.
    pub fn invalidate(&self, process_id: &str) -> Option<Arc<CacheEntry>> {
        let removed = self.slots.write().live.remove(process_id);
        if removed.is_some() {
            self.bump();
            debug!(process = process_id, "invalidated cache entry");
        }
        self.prune_build_lock(process_id);
        removed
    }

    /// Remove the entry for `process_id` and refuse lazy publications of it
    /// until the next [`put`](Self::put). Returns the removed entry, if any.
    pub fn retire(&self, process_id: &str) -> Option<Arc<CacheEntry>> {
        let removed = {
            let mut slots = self.slots.write();
            slots.retired.insert(Arc::from(process_id));
            slots.live.remove(process_id)
        };
        self.bump();
        debug!(process = process_id, existed = removed.is_some(), "retired process");
        self.prune_build_lock(process_id);
        removed
    }

    pub fn is_retired(&self, process_id: &str) -> bool {
        self.slots.read().retired.contains(process_id)
    }

    /// Drop every entry and every retirement.
    pub fn clear(&self) {
        let mut slots = self.slots.write();
        if !slots.live.is_empty() || !slots.retired.is_empty() {
            slots.live.clear();
            slots.retired.clear();
            self.bump();
        }
        self.build_locks.lock().retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Lock serialising builds of one process id.
    pub fn build_lock(&self, process_id: &str) -> Arc<Mutex<()>> {
        self.build_locks
            .lock()
            .entry(Arc::from(process_id))
            .or_default()
            .clone()
    }

    /// Number of publications, invalidations and retirements so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.slots.read().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().live.is_empty()
    }

    /// Ids of every cached process, in no particular order.
    pub fn process_ids(&self) -> Vec<Arc<str>> {
        self.slots.read().live.keys().cloned().collect()
    }

    fn prune_build_lock(&self, process_id: &str) {
        let mut locks = self.build_locks.lock();
        if locks
            .get(process_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(process_id);
        }
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl std::fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorCache")
            .field("entries", &self.len())
            .field("generation", &self.generation())
            .finish()
    }
}
