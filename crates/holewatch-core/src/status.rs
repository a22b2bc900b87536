// ── Kill status source ──
//
// The check cycle only needs "newest kill for this system, or nothing".
// Transport and decode failures are logged here and collapse to `None`.

use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use holewatch_api::KillboardClient;
use tracing::{debug, warn};

use crate::model::{SystemId, Watermark};

/// Why a status fetch produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    /// Network error, timeout, rate limit or server error.
    Transient,
    /// The killboard answered with something that is not a kill list.
    Decode,
}

impl FetchFailure {
    pub fn classify(err: &holewatch_api::Error) -> Self {
        if err.is_decode() {
            Self::Decode
        } else {
            Self::Transient
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => f.write_str("transient"),
            Self::Decode => f.write_str("decode"),
        }
    }
}

/// Source of the most recent kill for a system.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// One request, no retry. `None` for an empty kill list or any failure.
    async fn latest_event(&self, system_id: SystemId, limit: u32) -> Option<Watermark>;
}

/// [`StatusSource`] backed by the zKillboard API.
pub struct KillboardStatus {
    client: KillboardClient,
}

impl KillboardStatus {
    pub fn new(client: KillboardClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource for KillboardStatus {
    async fn latest_event(&self, system_id: SystemId, limit: u32) -> Option<Watermark> {
        match self.client.latest_kill(system_id, limit).await {
            Ok(Some(kill)) => {
                let time = kill
                    .kill_time
                    .unwrap_or_else(|| Utc::now().format("%Y-%m-%d %H:%M:%S").to_string());
                Some(Watermark::new(kill.kill_id, time))
            }
            Ok(None) => {
                debug!(system_id, limit, "no kills returned");
                None
            }
            Err(e) => {
                let failure = FetchFailure::classify(&e);
                warn!(system_id, limit, %failure, error = %e, "killboard fetch failed");
                None
            }
        }
    }
}
