// ── Mirror replication ──
//
// Roster and group mutations are mirrored to a secondary store through a
// bounded queue drained by a small worker pool. Callers never wait and
// never see the outcome: a full queue drops the operation, a failed
// write is logged and forgotten.

mod journal;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ReplicationConfig;
use crate::model::{GroupId, SystemId};

pub use journal::JournalMirror;

/// One queued mirror write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MirrorOp {
    UpsertSystem {
        system_id: SystemId,
        comments: String,
    },
    DeleteSystem {
        system_id: SystemId,
    },
    AddGroup {
        group_id: GroupId,
        description: String,
        member_ids: Vec<SystemId>,
    },
    DeleteGroup {
        group_id: GroupId,
        member_ids: Vec<SystemId>,
    },
    /// Delete the old member set, then add the new one, in one task.
    ReplaceGroup {
        group_id: GroupId,
        old_member_ids: Vec<SystemId>,
        description: String,
        member_ids: Vec<SystemId>,
    },
}

impl MirrorOp {
    fn kind(&self) -> &'static str {
        match self {
            Self::UpsertSystem { .. } => "upsert_system",
            Self::DeleteSystem { .. } => "delete_system",
            Self::AddGroup { .. } => "add_group",
            Self::DeleteGroup { .. } => "delete_group",
            Self::ReplaceGroup { .. } => "replace_group",
        }
    }
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("mirror I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("mirror record could not be encoded: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("mirror rejected the write: {0}")]
    Rejected(String),
}

/// Secondary store that can be opened for a short write session.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    async fn open(&self) -> Result<Box<dyn MirrorSession>, MirrorError>;
}

/// A single open connection to the mirror. Never read back.
#[async_trait]
pub trait MirrorSession: Send {
    async fn upsert_system(&mut self, system_id: SystemId, comments: &str)
    -> Result<(), MirrorError>;

    async fn delete_system(&mut self, system_id: SystemId) -> Result<(), MirrorError>;

    async fn add_group(
        &mut self,
        group_id: GroupId,
        description: &str,
        member_ids: &[SystemId],
    ) -> Result<(), MirrorError>;

    async fn delete_group(
        &mut self,
        group_id: GroupId,
        member_ids: &[SystemId],
    ) -> Result<(), MirrorError>;

    async fn close(self: Box<Self>) -> Result<(), MirrorError>;
}

// ── Dispatcher ───────────────────────────────────────────────────────

/// Handle used by the roster and group registry to queue mirror writes.
#[derive(Clone, Default)]
pub struct Replicator {
    tx: Option<mpsc::Sender<MirrorOp>>,
}

impl Replicator {
    /// A replicator that discards everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Start the worker pool. Workers stop once `cancel` fires and the
    /// queue has been drained.
    pub fn spawn(
        store: Arc<dyn MirrorStore>,
        config: ReplicationConfig,
        cancel: &CancellationToken,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let handles = (0..config.workers.max(1))
            .map(|worker| {
                tokio::spawn(replication_worker(
                    worker,
                    Arc::clone(&store),
                    Arc::clone(&rx),
                    cancel.clone(),
                ))
            })
            .collect();
        (Self { tx: Some(tx) }, handles)
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queue an operation without waiting. Dropped with a warning if the
    /// queue is full or the workers are gone.
    pub fn enqueue(&self, op: MirrorOp) {
        let Some(ref tx) = self.tx else { return };
        let kind = op.kind();
        match tx.try_send(op) {
            Ok(()) => debug!(op = kind, "mirror operation queued"),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(op = kind, "mirror queue full, operation dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(op = kind, "mirror workers stopped, operation dropped");
            }
        }
    }
}

async fn replication_worker(
    worker: usize,
    store: Arc<dyn MirrorStore>,
    rx: Arc<Mutex<mpsc::Receiver<MirrorOp>>>,
    cancel: CancellationToken,
) {
    loop {
        let next = {
            let mut rx = rx.lock().await;
            tokio::select! {
                biased;
                () = cancel.cancelled() => rx.try_recv().ok(),
                op = rx.recv() => op,
            }
        };
        let Some(op) = next else { break };
        let kind = op.kind();
        if let Err(e) = apply(store.as_ref(), op).await {
            warn!(worker, op = kind, error = %e, "mirror write failed");
        }
    }
    debug!(worker, "mirror worker stopped");
}

/// Open a session, perform the operation's writes, close.
async fn apply(store: &dyn MirrorStore, op: MirrorOp) -> Result<(), MirrorError> {
    let mut session = store.open().await?;
    match op {
        MirrorOp::UpsertSystem {
            system_id,
            comments,
        } => session.upsert_system(system_id, &comments).await?,
        MirrorOp::DeleteSystem { system_id } => session.delete_system(system_id).await?,
        MirrorOp::AddGroup {
            group_id,
            description,
            member_ids,
        } => {
            session
                .add_group(group_id, &description, &member_ids)
                .await?;
        }
        MirrorOp::DeleteGroup {
            group_id,
            member_ids,
        } => session.delete_group(group_id, &member_ids).await?,
        MirrorOp::ReplaceGroup {
            group_id,
            old_member_ids,
            description,
            member_ids,
        } => {
            session.delete_group(group_id, &old_member_ids).await?;
            session
                .add_group(group_id, &description, &member_ids)
                .await?;
        }
    }
    session.close().await
}
