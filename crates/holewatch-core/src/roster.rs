// ── Wormhole roster ──
//
// In-memory list of monitored systems kept in step with the primary
// store. Every mutation takes the store lock, writes the store, then the
// memory, and queues a mirror write after the lock is released.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::catalog::{Catalog, Derivation, StaticInfo};
use crate::error::CoreError;
use crate::model::{MonitoredEntity, SystemName, Watermark};
use crate::replication::{MirrorOp, Replicator};
use crate::shortlink::FormattedText;
use crate::status::StatusSource;
use crate::store::{self, EntityCollection, SharedStore, SystemRow};

/// Outcome of offering a fetched kill to the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WatermarkUpdate {
    /// Newer than the stored watermark; memory updated.
    Applied(Arc<MonitoredEntity>),
    /// Not strictly newer; nothing changed.
    Stale,
    /// The system left the roster since the cycle's snapshot.
    Missing,
}

pub struct Roster {
    entities: EntityCollection<MonitoredEntity>,
    store: SharedStore,
    catalog: Arc<dyn Catalog>,
    status: Arc<dyn StatusSource>,
    replicator: Replicator,
}

impl Roster {
    pub(crate) fn new(
        store: SharedStore,
        catalog: Arc<dyn Catalog>,
        status: Arc<dyn StatusSource>,
        replicator: Replicator,
    ) -> Self {
        Self {
            entities: EntityCollection::new(),
            store,
            catalog,
            status,
            replicator,
        }
    }

    /// Replace memory with the store's contents, looking classes up in
    /// the catalog.
    pub(crate) fn load(&self) -> Result<usize, CoreError> {
        let guard = store::lock(&self.store);
        let rows = guard.load_systems()?;
        let count = rows.len();
        self.entities.replace_all(rows.into_iter().map(|row| {
            let entity = self.entity_from_row(row);
            (entity.name.to_string(), entity)
        }));
        debug!(count, "roster loaded");
        Ok(count)
    }

    /// `true` if the catalog knows `name`.
    pub fn validate(&self, name: &str) -> bool {
        self.catalog.is_known(name)
    }

    /// Start monitoring a system.
    ///
    /// The initial watermark is the newest kill on record, or the sentinel
    /// when the killboard has nothing, so only later kills are reported.
    pub async fn add(
        &self,
        name: &str,
        watched: bool,
        comments: &str,
    ) -> Result<Arc<MonitoredEntity>, CoreError> {
        let name = SystemName::new(name);
        let id = self
            .catalog
            .system_id(name.as_str())
            .ok_or_else(|| CoreError::UnknownSystem {
                name: name.to_string(),
            })?;
        if self.entities.contains(name.as_str()) {
            return Err(CoreError::AlreadyTracked {
                name: name.to_string(),
            });
        }

        let watermark = self
            .status
            .latest_event(id, 1)
            .await
            .unwrap_or_else(Watermark::sentinel);
        let text = FormattedText::new(comments);
        let row = SystemRow {
            id,
            name: name.clone(),
            created: Utc::now().date_naive(),
            comments: text.plain,
            watermark,
            watched,
        };

        let entity = {
            let guard = store::lock(&self.store);
            if self.entities.contains(name.as_str()) {
                return Err(CoreError::AlreadyTracked {
                    name: name.to_string(),
                });
            }
            guard.insert_system(&row)?;
            let entity = self.entity_from_row(row);
            self.entities.upsert(name.to_string(), entity.clone());
            Arc::new(entity)
        };

        info!(system = %name, id, watched, "system added");
        self.replicator.enqueue(MirrorOp::UpsertSystem {
            system_id: id,
            comments: text.html,
        });
        Ok(entity)
    }

    pub fn remove(&self, name: &str) -> Result<(), CoreError> {
        let name = SystemName::new(name);
        let removed = {
            let guard = store::lock(&self.store);
            let Some(current) = self.entities.get(name.as_str()) else {
                return Err(CoreError::system_not_found(name.as_str()));
            };
            guard.delete_system(&name)?;
            self.entities.remove(name.as_str());
            current
        };

        info!(system = %name, "system removed");
        self.replicator.enqueue(MirrorOp::DeleteSystem {
            system_id: removed.id,
        });
        Ok(())
    }

    /// Set `watched`, and replace the comments unless `comments` is empty.
    pub fn edit(
        &self,
        name: &str,
        watched: bool,
        comments: &str,
    ) -> Result<Arc<MonitoredEntity>, CoreError> {
        let name = SystemName::new(name);
        let text = (!comments.is_empty()).then(|| FormattedText::new(comments));

        let entity = {
            let guard = store::lock(&self.store);
            let Some(current) = self.entities.get(name.as_str()) else {
                return Err(CoreError::system_not_found(name.as_str()));
            };
            let mut updated = (*current).clone();
            updated.watched = watched;
            match text {
                Some(ref text) => {
                    guard.update_watched_and_comments(&name, watched, &text.plain)?;
                    updated.comments.clone_from(&text.plain);
                }
                None => guard.update_watched(&name, watched)?,
            }
            self.entities.upsert(name.to_string(), updated.clone());
            Arc::new(updated)
        };

        info!(system = %name, watched, comments = text.is_some(), "system edited");
        // Mirrored whenever supplied: link targets exist only in the html form.
        if let Some(text) = text {
            self.replicator.enqueue(MirrorOp::UpsertSystem {
                system_id: entity.id,
                comments: text.html,
            });
        }
        Ok(entity)
    }

    pub fn get(&self, name: &str) -> Option<Arc<MonitoredEntity>> {
        self.entities.get(SystemName::new(name).as_str())
    }

    /// All systems sorted by name. The returned list is a snapshot and
    /// does not change when the roster does.
    pub fn list(&self) -> Arc<Vec<Arc<MonitoredEntity>>> {
        self.entities.snapshot()
    }

    /// Receive a fresh sorted snapshot after every mutation.

    /// Empty the roster and the primary store. The mirror is left as is.
    pub fn clear(&self) -> Result<(), CoreError> {
        let guard = store::lock(&self.store);
        guard.clear_systems()?;
        self.entities.clear();
        info!("roster cleared");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.len() == 0
    }

    // ── Catalog wrappers ─────────────────────────────────────────────

    pub fn info(&self, name: &str) -> String {
        self.catalog
            .describe(name)
            .unwrap_or_else(|| format!("Unknown wormhole name '{}'", name.trim()))
    }

    /// Resolve a group description without creating a group.
    pub fn search(&self, description: &str) -> Derivation {
        self.catalog.derive(description)
    }

    pub fn static_info(&self, code: &str) -> Option<StaticInfo> {
        self.catalog.static_info(code)
    }

    // ── Check cycle support ──────────────────────────────────────────

    /// Record `mark` if the system is still listed and `mark` is newer.
    pub(crate) fn apply_watermark(&self, name: &SystemName, mark: &Watermark) -> WatermarkUpdate {
        let _guard = store::lock(&self.store);
        let Some(current) = self.entities.get(name.as_str()) else {
            return WatermarkUpdate::Missing;
        };
        if !current.watermark.is_superseded_by(mark.event_id) {
            return WatermarkUpdate::Stale;
        }
        let mut updated = (*current).clone();
        updated.watermark = mark.clone();
        self.entities.upsert(name.to_string(), updated.clone());
        WatermarkUpdate::Applied(Arc::new(updated))
    }

    fn entity_from_row(&self, row: SystemRow) -> MonitoredEntity {
        let class = self
            .catalog
            .class_of(row.name.as_str())
            .unwrap_or_else(|| "Unknown".into());
        MonitoredEntity {
            id: row.id,
            name: row.name,
            class,
            created: row.created,
            comments: row.comments,
            watermark: row.watermark,
            watched: row.watched,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{FixedStatus, Harness};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn add_without_history_seeds_sentinel() {
        let h = Harness::new(FixedStatus::empty());
        let entity = h.roster.add("J123456", true, "").await.unwrap();

        assert_eq!(entity.watermark, Watermark::sentinel());
        assert_eq!(entity.class, "C2");
        assert!(h.roster.validate("J123456"));
        assert_eq!(h.status.calls(), vec![(31_000_004, 1)]);
    }

    #[tokio::test]
    async fn add_seeds_latest_kill() {
        let status = FixedStatus::empty().with(31_000_004, Watermark::new(42, "2024-02-02 02:02:02"));
        let h = Harness::new(status);
        let entity = h.roster.add("j123456", true, "").await.unwrap();
        assert_eq!(entity.watermark.event_id, 42);
    }

    #[tokio::test]
    async fn lookups_ignore_case() {
        let h = Harness::new(FixedStatus::empty());
        h.roster.add("j123456", true, "").await.unwrap();
        assert_eq!(h.roster.get("J123456").unwrap().name.as_str(), "J123456");
        assert!(h.roster.get(" j123456 ").is_some());
    }

    #[tokio::test]
    async fn duplicate_add_is_conflict_and_changes_nothing() {
        let h = Harness::new(FixedStatus::empty());
        h.roster.add("J123456", true, "first").await.unwrap();

        let err = h.roster.add("j123456", false, "second").await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(h.roster.len(), 1);
        assert_eq!(h.roster.get("J123456").unwrap().comments, "first");
    }

    #[tokio::test]
    async fn unknown_name_is_conflict() {
        let h = Harness::new(FixedStatus::empty());
        let err = h.roster.add("Jita", true, "").await.unwrap_err();
        assert!(matches!(err, CoreError::UnknownSystem { .. }));
        assert!(h.roster.is_empty());
        assert!(h.status.calls().is_empty());
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let h = Harness::new(FixedStatus::empty());
        h.roster.add("J123456", true, "").await.unwrap();
        h.roster.add("J000123", true, "").await.unwrap();
        h.roster.add("J100002", true, "").await.unwrap();

        let names: Vec<String> = h.roster.list().iter().map(|e| e.name.to_string()).collect();
        assert_eq!(names, vec!["J000123", "J100002", "J123456"]);
    }

    #[tokio::test]
    async fn edit_keeps_comments_when_empty() {
        let h = Harness::new(FixedStatus::empty());
        h.roster.add("J123456", true, "keep me").await.unwrap();

        let edited = h.roster.edit("J123456", false, "").unwrap();
        assert!(!edited.watched);
        assert_eq!(edited.comments, "keep me");

        let edited = h.roster.edit("J123456", true, "<https://x.io/m|map>").unwrap();
        assert_eq!(edited.comments, "map");
    }

    #[tokio::test]
    async fn edit_and_remove_missing_are_not_found() {
        let h = Harness::new(FixedStatus::empty());
        assert!(h.roster.edit("J123456", true, "").unwrap_err().is_not_found());
        assert!(h.roster.remove("J123456").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn state_survives_reload() {
        let h = Harness::new(FixedStatus::empty());
        h.roster.add("J123456", true, "note").await.unwrap();
        h.roster.add("J100001", true, "").await.unwrap();
        h.roster.remove("J100001").unwrap();
        h.roster.edit("J123456", false, "").unwrap();

        let reopened = h.reopen_roster();
        assert_eq!(reopened.load().unwrap(), 1);
        let entity = reopened.get("J123456").unwrap();
        assert!(!entity.watched);
        assert_eq!(entity.comments, "note");
        assert_eq!(entity.class, "C2");
    }

    #[tokio::test]
    async fn clear_empties_memory_and_store() {
        let h = Harness::new(FixedStatus::empty());
        h.roster.add("J123456", true, "").await.unwrap();
        h.roster.clear().unwrap();
        assert!(h.roster.is_empty());
        assert_eq!(h.reopen_roster().load().unwrap(), 0);
    }

    #[tokio::test]
    async fn watermark_only_moves_forward() {
        let h = Harness::new(FixedStatus::empty());
        h.roster.add("J123456", true, "").await.unwrap();
        let name = SystemName::new("J123456");

        let applied = h.roster.apply_watermark(&name, &Watermark::new(5, "t5"));
        assert!(matches!(applied, WatermarkUpdate::Applied(ref e) if e.watermark.event_id == 5));
        assert_eq!(
            h.roster.apply_watermark(&name, &Watermark::new(5, "t5")),
            WatermarkUpdate::Stale
        );
        assert_eq!(
            h.roster.apply_watermark(&SystemName::new("J100001"), &Watermark::new(9, "t9")),
            WatermarkUpdate::Missing
        );
    }

    #[tokio::test]
    async fn mutations_are_mirrored_except_clear() {
        let mut h = Harness::with_mirror(FixedStatus::empty());
        h.roster
            .add("J123456", true, "<https://x.io/m|map>")
            .await
            .unwrap();
        h.roster.edit("J123456", false, "").unwrap();
        h.roster.edit("J123456", true, "<https://x.io/m|map>").unwrap();
        h.roster.edit("J123456", true, "fresh").unwrap();
        h.roster.remove("J123456").unwrap();
        h.roster.add("J100001", true, "").await.unwrap();
        h.roster.clear().unwrap();

        let calls = h.flush_mirror().await;
        let writes: Vec<&String> = calls
            .iter()
            .filter(|c| *c != "open" && *c != "close")
            .collect();
        assert_eq!(
            writes,
            vec![
                "upsert 31000004 <a href=\"https://x.io/m\" target=\"_blank\">map</a>",
                "upsert 31000004 <a href=\"https://x.io/m\" target=\"_blank\">map</a>",
                "upsert 31000004 fresh",
                "delete 31000004",
                "upsert 31000001 ",
            ]
        );
    }

    #[tokio::test]
    async fn edit_mirrors_new_link_target_with_same_label() {
        let mut h = Harness::with_mirror(FixedStatus::empty());
        h.roster
            .add("J123456", true, "<https://old.io/m|map>")
            .await
            .unwrap();
        let edited = h.roster.edit("J123456", true, "<https://new.io/m|map>").unwrap();
        assert_eq!(edited.comments, "map");

        let calls = h.flush_mirror().await;
        let upserts: Vec<&String> = calls.iter().filter(|c| c.starts_with("upsert")).collect();
        assert_eq!(
            upserts,
            vec![
                "upsert 31000004 <a href=\"https://old.io/m\" target=\"_blank\">map</a>",
                "upsert 31000004 <a href=\"https://new.io/m\" target=\"_blank\">map</a>",
            ]
        );
    }

    #[test]
    fn catalog_wrappers() {
        let h = Harness::new(FixedStatus::empty());
        assert!(h.roster.info("J123456").starts_with("*J123456* [C2]"));
        assert_eq!(h.roster.info("nowhere"), "Unknown wormhole name 'nowhere'");
        assert!(h.roster.search("C3 HS").codes.contains("J100001"));
        assert_eq!(h.roster.static_info("b274").unwrap().leads_to, "HS");
    }
}
