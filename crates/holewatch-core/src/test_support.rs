// ── Shared test fixtures ──

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::catalog::JsonCatalog;
use crate::config::{MonitorConfig, ReplicationConfig, StorageConfig};
use crate::groups::GroupRegistry;
use crate::model::{EntityGroup, MonitoredEntity, SystemId, Watermark};
use crate::replication::Replicator;
use crate::replication::tests::RecordingMirror;
use crate::reporter::Reporter;
use crate::roster::Roster;
use crate::status::StatusSource;
use crate::store::{PrimaryStore, SharedStore};

type Hook = Box<dyn Fn(SystemId) + Send + Sync>;

/// Status source answering from a fixed table and recording every call.
#[derive(Default)]
pub(crate) struct FixedStatus {
    marks: Mutex<HashMap<SystemId, Watermark>>,
    calls: Mutex<Vec<(SystemId, u32)>>,
    hook: Mutex<Option<Hook>>,
}

impl FixedStatus {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn with(self, id: SystemId, mark: Watermark) -> Self {
        self.set(id, mark);
        self
    }

    pub(crate) fn set(&self, id: SystemId, mark: Watermark) {
        self.marks.lock().unwrap().insert(id, mark);
    }

    /// Run `hook` at the start of every fetch.
    pub(crate) fn on_fetch(&self, hook: impl Fn(SystemId) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub(crate) fn calls(&self) -> Vec<(SystemId, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusSource for FixedStatus {
    async fn latest_event(&self, system_id: SystemId, limit: u32) -> Option<Watermark> {
        if let Some(ref hook) = *self.hook.lock().unwrap() {
            hook(system_id);
        }
        self.calls.lock().unwrap().push((system_id, limit));
        self.marks.lock().unwrap().get(&system_id).cloned()
    }
}

/// Reporter that records each report as a short line.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl Reporter for RecordingReporter {
    fn kill_detected(&self, entity: &MonitoredEntity) {
        self.push(format!("kill {} {}", entity.name, entity.watermark.event_id));
    }

    fn connection_match(&self, entity: &MonitoredEntity) {
        self.push(format!("connection {}", entity.name));
    }

    fn group_match(&self, group: &EntityGroup, code: &str) {
        self.push(format!("group {} {code}", group.id));
    }

    fn pattern_match(&self, code: &str) {
        self.push(format!("pattern {code}"));
    }
}

/// Temporary database with a roster and group registry over the fixture
/// catalog.
pub(crate) struct Harness {
    _dir: tempfile::TempDir,
    pub(crate) config: MonitorConfig,
    pub(crate) catalog: Arc<JsonCatalog>,
    pub(crate) status: Arc<FixedStatus>,
    pub(crate) roster: Arc<Roster>,
    pub(crate) groups: Arc<GroupRegistry>,
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
    mirror_calls: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    pub(crate) fn new(status: FixedStatus) -> Self {
        Self::build(status, None)
    }

    /// Like [`Harness::new`] with a single-worker recording mirror.
    /// Must be called inside a tokio runtime.
    pub(crate) fn with_mirror(status: FixedStatus) -> Self {
        Self::build(status, Some(RecordingMirror::default()))
    }

    fn build(status: FixedStatus, mirror: Option<RecordingMirror>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig {
            storage: StorageConfig {
                database: dir.path().join("holewatch.db"),
                ..StorageConfig::default()
            },
            replication: ReplicationConfig {
                queue_capacity: 64,
                workers: 1,
            },
            api_wait: std::time::Duration::ZERO,
            ..MonitorConfig::default()
        };
        let catalog = Arc::new(crate::catalog::tests::fixture());
        let status = Arc::new(status);
        let store: SharedStore = Arc::new(Mutex::new(PrimaryStore::open(&config.storage).unwrap()));

        let cancel = CancellationToken::new();
        let mut mirror_calls = Arc::new(Mutex::new(Vec::new()));
        let (replicator, handles) = match mirror {
            Some(mirror) => {
                mirror_calls = Arc::clone(&mirror.calls);
                Replicator::spawn(Arc::new(mirror), config.replication, &cancel)
            }
            None => (Replicator::disabled(), Vec::new()),
        };

        let roster = Arc::new(Roster::new(
            Arc::clone(&store),
            catalog.clone(),
            status.clone(),
            replicator.clone(),
        ));
        let groups = Arc::new(GroupRegistry::new(store, catalog.clone(), replicator));

        Self {
            _dir: dir,
            config,
            catalog,
            status,
            roster,
            groups,
            cancel,
            handles,
            mirror_calls,
        }
    }

    fn reopen_store(&self) -> SharedStore {
        Arc::new(Mutex::new(PrimaryStore::open(&self.config.storage).unwrap()))
    }

    pub(crate) fn reopen_roster(&self) -> Roster {
        Roster::new(
            self.reopen_store(),
            self.catalog.clone(),
            self.status.clone(),
            Replicator::disabled(),
        )
    }

    pub(crate) fn reopen_groups(&self) -> GroupRegistry {
        GroupRegistry::new(self.reopen_store(), self.catalog.clone(), Replicator::disabled())
    }

    pub(crate) fn open_store(&self) -> PrimaryStore {
        PrimaryStore::open(&self.config.storage).unwrap()
    }

    /// Stop the mirror workers after they drain, and return what they did.
    pub(crate) async fn flush_mirror(&mut self) -> Vec<String> {
        self.cancel.cancel();
        for handle in self.handles.drain(..) {
            handle.await.unwrap();
        }
        self.mirror_calls.lock().unwrap().clone()
    }
}
