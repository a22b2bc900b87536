// ── Report sink ──

use crate::model::{EntityGroup, MonitoredEntity};

/// Receives everything the check cycle detects.
///
/// Called synchronously from inside the cycle. Implementations hand the
/// report off (log line, chat post, ...) and return promptly; delivery
/// is not retried.
pub trait Reporter: Send + Sync {
    /// A new kill was recorded. `entity` carries the updated watermark.
    fn kill_detected(&self, entity: &MonitoredEntity);

    /// A watched system showed up in the connection feed.
    fn connection_match(&self, entity: &MonitoredEntity);

    /// A feed system satisfies a generic group.
    fn group_match(&self, group: &EntityGroup, code: &str);

    /// A feed system matches the special-name pattern.
    fn pattern_match(&self, code: &str);
}
