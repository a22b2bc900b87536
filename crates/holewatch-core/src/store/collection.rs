// ── Keyed in-memory collection ──
//
// Concurrent keyed storage with a sorted snapshot that is rebuilt on
// every mutation and held in a `watch` channel.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// Concurrent collection for one record type.
///
/// Readers either look a key up directly or take the snapshot, an
/// immutable `Arc<Vec<_>>` ordered by key. A snapshot held across later
/// mutations keeps showing the state it was taken from.
pub(crate) struct EntityCollection<T: Send + Sync + 'static> {
    /// Primary storage: key string -> record.
    /// Keys are system names for the roster and `grp:{id:012}` for groups,
    /// so key order is name order and id order respectively.
    by_key: DashMap<String, Arc<T>>,

    /// Sorted snapshot, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_key: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or replace a record. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: String, value: T) -> bool {
        let is_new = self.by_key.insert(key, Arc::new(value)).is_none();
        self.rebuild_snapshot();
        is_new
    }

    /// Replace the contents with `entries`, publishing a single snapshot.
    ///
    /// Keys present before and after stay readable throughout; only keys
    /// missing from `entries` are dropped.
    pub(crate) fn replace_all(&self, entries: impl IntoIterator<Item = (String, T)>) {
        let mut kept = HashSet::new();
        for (key, value) in entries {
            kept.insert(key.clone());
            self.by_key.insert(key, Arc::new(value));
        }
        self.by_key.retain(|key, _| kept.contains(key));
        self.rebuild_snapshot();
    }

    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.by_key.clear();
        self.rebuild_snapshot();
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    fn rebuild_snapshot(&self) {
        let mut entries: Vec<(String, Arc<T>)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let values = entries.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
