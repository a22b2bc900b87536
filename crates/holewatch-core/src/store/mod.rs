// ── Storage ──

mod collection;
mod sqlite;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub(crate) use collection::EntityCollection;
pub(crate) use sqlite::{GroupRow, PrimaryStore, SystemRow};

/// Primary store connection shared by the roster and the group registry.
///
/// Holding the guard is what makes a CRUD mutation atomic: memory and
/// store are both updated before it is released.
pub(crate) type SharedStore = Arc<Mutex<PrimaryStore>>;

pub(crate) fn lock(store: &Mutex<PrimaryStore>) -> MutexGuard<'_, PrimaryStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}
