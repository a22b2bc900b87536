// ── Domain model ──

mod group;
mod ids;
mod system;

pub use group::EntityGroup;
pub use ids::{GroupId, SystemId, SystemName};
pub use system::{MonitoredEntity, Watermark};
