// ── Monitored wormhole ──

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::ids::{SystemId, SystemName};

/// Newest kill already reported for a system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Watermark {
    pub event_id: u64,
    pub event_time: String,
}

impl Watermark {
    pub const SENTINEL_ID: u64 = 1;
    pub const SENTINEL_TIME: &'static str = "2016-01-01 00:00:00";

    pub fn new(event_id: u64, event_time: impl Into<String>) -> Self {
        Self {
            event_id,
            event_time: event_time.into(),
        }
    }

    /// Seed for systems with no kill history, so any real kill compares greater.
    pub fn sentinel() -> Self {
        Self::new(Self::SENTINEL_ID, Self::SENTINEL_TIME)
    }

    /// `true` when `event_id` is strictly newer than this watermark.
    pub fn is_superseded_by(&self, event_id: u64) -> bool {
        event_id > self.event_id
    }
}

/// A wormhole on the watchlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitoredEntity {
    pub id: SystemId,
    pub name: SystemName,
    /// Looked up from the catalog on insert and load, never persisted.
    pub class: String,
    pub created: NaiveDate,
    pub comments: String,
    pub watermark: Watermark,
    /// Unwatched systems stay on the list but are never polled.
    pub watched: bool,
}

impl fmt::Display for MonitoredEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "*{}* [{}] - Created: {}, Watchlist: {}, LastKill: {}, Info: *{}*",
            self.name,
            self.class,
            self.created.format("%Y-%m-%d"),
            self.watched,
            self.watermark.event_time,
            self.comments,
        )
    }
}
