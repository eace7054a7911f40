//! The reconciliation core: one ordered, unique-by-id collection that all
//! three writers (snapshot, stream, local share) mutate through `replace_all`
//! and `upsert`, the sole serialization point for location state.

use crate::core::record::LocationRecord;
use std::sync::{Arc, Mutex};

/// Callback invoked with the post-mutation collection on every commit.
pub type StoreSubscriber = Box<dyn Fn(&[LocationRecord]) + Send + 'static>;

/// Ordered collection of location records, unique by `id`.
///
/// Insertion order is display order; an upsert that hits an existing id
/// replaces the entry in place without moving it. Cloning the store clones
/// the handle, not the data.
#[derive(Clone)]
pub struct LocationStore {
    records: Arc<Mutex<Vec<LocationRecord>>>,
    subscribers: Arc<Mutex<Vec<StoreSubscriber>>>,
}

impl Default for LocationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replaces the whole collection. Used exactly once per session, to
    /// apply the snapshot result.
    pub fn replace_all(&self, records: Vec<LocationRecord>) {
        let snapshot = {
            let mut guard = self.records.lock().expect("store lock poisoned");
            *guard = records;
            guard.clone()
        };
        log::debug!("store replaced, {} record(s)", snapshot.len());
        self.notify(&snapshot);
    }

    /// Insert-or-update keyed by `id`, position-stable on update.
    ///
    /// Records without an id cannot collide and are always appended.
    pub fn upsert(&self, record: LocationRecord) {
        let snapshot = {
            let mut guard = self.records.lock().expect("store lock poisoned");
            let existing = if record.id.is_empty() {
                None
            } else {
                guard.iter_mut().find(|r| r.id == record.id)
            };
            match existing {
                Some(slot) => *slot = record,
                None => guard.push(record),
            }
            guard.clone()
        };
        self.notify(&snapshot);
    }

    /// The last record in insertion order, or `None` when empty.
    pub fn most_recent(&self) -> Option<LocationRecord> {
        self.records
            .lock()
            .expect("store lock poisoned")
            .last()
            .cloned()
    }

    /// A cloned snapshot of the collection in display order.
    pub fn records(&self) -> Vec<LocationRecord> {
        self.records.lock().expect("store lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers a callback invoked after every committed mutation with the
    /// post-mutation collection. Callbacks run with the record lock
    /// released, so a subscriber may read the store.
    pub fn subscribe(&self, callback: impl Fn(&[LocationRecord]) + Send + 'static) {
        self.subscribers
            .lock()
            .expect("store lock poisoned")
            .push(Box::new(callback));
    }

    fn notify(&self, snapshot: &[LocationRecord]) {
        let subscribers = self.subscribers.lock().expect("store lock poisoned");
        for subscriber in subscribers.iter() {
            subscriber(snapshot);
        }
    }
}
