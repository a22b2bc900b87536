//! Watchlist, connection-feed matching and kill detection for wormhole
//! space.
//!
//! - **[`Watchlist`]** — Facade owning the primary store, the roster, the
//!   group registry and the background tasks.
//!   [`open()`](Watchlist::open) loads both tables and starts the mirror
//!   workers; [`start()`](Watchlist::start) schedules the check cycle.
//!
//! - **[`Roster`]** / **[`GroupRegistry`]** — In-memory views kept in step
//!   with the SQLite primary store. Every mutation writes the store, then
//!   memory, then queues a [`MirrorOp`] for the secondary store.
//!
//! - **[`Monitor`]** — The check cycle: connection feed refresh, dedup
//!   eviction, group/pattern matches, per-system kill polling with rate
//!   limiting and watermark comparison. Results go to a [`Reporter`].
//!
//! - **Collaborators** — [`Catalog`] (static universe data),
//!   [`StatusSource`] (newest kill per system), [`ConnectionFeed`] (live
//!   hub connections) and [`MirrorStore`] (write-only replica).

pub mod catalog;
pub mod config;
pub mod dedup;
pub mod error;
pub mod feed;
pub mod groups;
pub mod model;
pub mod monitor;
pub mod replication;
pub mod reporter;
pub mod roster;
pub mod shortlink;
pub mod status;
mod store;
pub mod watchlist;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{Catalog, Derivation, JsonCatalog, StaticInfo, SystemInfo};
pub use config::{LimitPolicy, MonitorConfig, ReplicationConfig, StorageConfig};
pub use dedup::{DedupCache, DedupCaches};
pub use error::CoreError;
pub use feed::{ConnectionFeed, DisabledFeed, ScoutFeed};
pub use groups::GroupRegistry;
pub use model::{EntityGroup, GroupId, MonitoredEntity, SystemId, SystemName, Watermark};
pub use monitor::{CycleReport, Monitor};
pub use replication::{
    JournalMirror, MirrorError, MirrorOp, MirrorSession, MirrorStore, Replicator,
};
pub use reporter::Reporter;
pub use roster::Roster;
pub use shortlink::FormattedText;
pub use status::{FetchFailure, KillboardStatus, StatusSource};
pub use watchlist::{Collaborators, Watchlist};
