// ── Watchlist ──
//
// Owns the primary store, the roster, the group registry, the mirror
// workers and the check-cycle task. This is the entry point embedders
// use: open, mutate, start, shut down.

use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::MonitorConfig;
use crate::error::CoreError;
use crate::feed::ConnectionFeed;
use crate::groups::GroupRegistry;
use crate::monitor::Monitor;
use crate::replication::{MirrorStore, Replicator};
use crate::reporter::Reporter;
use crate::roster::Roster;
use crate::status::StatusSource;
use crate::store::{PrimaryStore, SharedStore};

/// External services the watchlist depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: Arc<dyn Catalog>,
    pub status: Arc<dyn StatusSource>,
    pub feed: Arc<dyn ConnectionFeed>,
    /// `None` disables mirroring.
    pub mirror: Option<Arc<dyn MirrorStore>>,
}

pub struct Watchlist {
    config: MonitorConfig,
    collaborators: Collaborators,
    roster: Arc<Roster>,
    groups: Arc<GroupRegistry>,
    cancel: CancellationToken,
    /// Mirror workers plus the check-cycle task once started.
    task_handles: AsyncMutex<Vec<JoinHandle<()>>>,
}

impl Watchlist {
    /// Open the primary store, load both tables and start the mirror
    /// workers. Must be called inside a tokio runtime.
    ///
    /// Failing to open the primary store is the one fatal error.
    pub fn open(config: MonitorConfig, collaborators: Collaborators) -> Result<Self, CoreError> {
        let store: SharedStore = Arc::new(Mutex::new(PrimaryStore::open(&config.storage)?));
        let cancel = CancellationToken::new();

        let (replicator, handles) = match collaborators.mirror {
            Some(ref mirror) => Replicator::spawn(Arc::clone(mirror), config.replication, &cancel),
            None => (Replicator::disabled(), Vec::new()),
        };

        let groups = Arc::new(GroupRegistry::new(
            Arc::clone(&store),
            Arc::clone(&collaborators.catalog),
            replicator.clone(),
        ));
        let roster = Arc::new(Roster::new(
            store,
            Arc::clone(&collaborators.catalog),
            Arc::clone(&collaborators.status),
            replicator,
        ));

        let watchlist = Self {
            config,
            collaborators,
            roster,
            groups,
            cancel,
            task_handles: AsyncMutex::new(handles),
        };
        let (system_count, group_count) = watchlist.reload()?;
        info!(
            systems = system_count,
            groups = group_count,
            database = %watchlist.config.storage.database.display(),
            "watchlist loaded"
        );
        Ok(watchlist)
    }

    /// Replace the in-memory roster and groups with the primary store's
    /// contents, groups first. Returns `(systems, groups)`.
    pub fn reload(&self) -> Result<(usize, usize), CoreError> {
        let group_count = self.groups.load()?;
        let system_count = self.roster.load()?;
        Ok((system_count, group_count))
    }

    pub fn roster(&self) -> &Arc<Roster> {
        &self.roster
    }

    pub fn groups(&self) -> &Arc<GroupRegistry> {
        &self.groups
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Build a check cycle over this watchlist without scheduling it.
    pub fn monitor(&self, reporter: Arc<dyn Reporter>) -> Result<Monitor, CoreError> {
        Monitor::new(
            self.config.clone(),
            Arc::clone(&self.roster),
            Arc::clone(&self.groups),
            Arc::clone(&self.collaborators.status),
            Arc::clone(&self.collaborators.feed),
            reporter,
        )
    }

    /// Start the periodic check cycle. Returns `false` without starting
    /// anything when reports are switched off.
    pub async fn start(&self, reporter: Arc<dyn Reporter>) -> Result<bool, CoreError> {
        if !self.config.reports_active {
            warn!("reports are inactive, check cycle not started");
            return Ok(false);
        }
        let monitor = self.monitor(reporter)?;
        let handle = tokio::spawn(monitor.run(self.cancel.child_token()));
        self.task_handles.lock().await.push(handle);
        Ok(true)
    }

    /// Resolves once shutdown has been requested.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Stop the check cycle, let the mirror workers drain their queue,
    /// and wait for all of them.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handles: Vec<JoinHandle<()>> = self.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "background task ended abnormally");
            }
        }
        info!("watchlist stopped");
    }
}
