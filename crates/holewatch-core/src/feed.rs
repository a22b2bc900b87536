// ── Live connection feed ──

use async_trait::async_trait;
use holewatch_api::ScoutClient;
use tracing::{debug, warn};

/// Source of systems currently connected to the hub.
#[async_trait]
pub trait ConnectionFeed: Send + Sync {
    /// Uppercase system names, in feed order. Empty when unavailable.
    async fn current_connections(&self) -> Vec<String>;
}

/// Feed used when scouting is switched off.
pub struct DisabledFeed;

#[async_trait]
impl ConnectionFeed for DisabledFeed {
    async fn current_connections(&self) -> Vec<String> {
        Vec::new()
    }
}

/// [`ConnectionFeed`] backed by the public signature list of a scouting
/// service, filtered to one hub system.
pub struct ScoutFeed {
    client: ScoutClient,
    hub: String,
}

impl ScoutFeed {
    pub fn new(client: ScoutClient, hub: impl Into<String>) -> Self {
        Self {
            client,
            hub: hub.into(),
        }
    }
}

#[async_trait]
impl ConnectionFeed for ScoutFeed {
    async fn current_connections(&self) -> Vec<String> {
        match self.client.connections(&self.hub).await {
            Ok(systems) => {
                debug!(hub = %self.hub, count = systems.len(), "connection feed refreshed");
                systems
            }
            Err(e) => {
                warn!(hub = %self.hub, error = %e, "connection feed unavailable");
                Vec::new()
            }
        }
    }
}
