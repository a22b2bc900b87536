// ── Runtime monitor configuration ──
//
// These types describe how the watchlist runs. They never touch disk;
// `holewatch-config` builds a `MonitorConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

/// How the killboard `limit` parameter grows across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitPolicy {
    /// `limit = cycle + 1`, wrapping when the cycle counter resets.
    #[default]
    Cycling,
    /// Always request the same window.
    Fixed(u32),
}

impl LimitPolicy {
    pub fn limit_for(self, cycle: u32) -> u32 {
        match self {
            Self::Cycling => cycle.saturating_add(1),
            Self::Fixed(limit) => limit.max(1),
        }
    }
}

/// Location and table names of the primary store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub database: PathBuf,
    pub systems_table: String,
    pub groups_table: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("holewatch.db"),
            systems_table: "wormholes".into(),
            groups_table: "generics".into(),
        }
    }
}

/// Sizing of the mirror replication queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicationConfig {
    pub queue_capacity: usize,
    pub workers: usize,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            workers: 2,
        }
    }
}

/// Configuration for the watchlist and its check cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub storage: StorageConfig,
    pub replication: ReplicationConfig,
    /// Period of the check cycle.
    pub interval: Duration,
    /// Pause before each killboard call.
    pub api_wait: Duration,
    /// Cycle counter wraps to zero when it reaches this value.
    pub cycle_limit: u32,
    /// How long a connection/group/pattern report suppresses repeats.
    pub dedup_ttl: Duration,
    pub limit_policy: LimitPolicy,
    /// Regex matched against connection-feed system names.
    pub pattern: String,
    /// When `false` the watchlist loads but the check cycle never starts.
    pub reports_active: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            replication: ReplicationConfig::default(),
            interval: Duration::from_secs(600),
            api_wait: Duration::from_secs(3),
            cycle_limit: 7,
            dedup_ttl: Duration::from_secs(12 * 3600),
            limit_policy: LimitPolicy::Cycling,
            pattern: "^J000[0-9]{3}$".into(),
            reports_active: true,
        }
    }
}
