// ── SQLite primary store ──
//
// Two tables: monitored systems keyed by external id and generic groups
// keyed by an autoincrement id. Both are created on open if absent.
// A `PrimaryStore` owns exactly one connection; the check cycle opens its
// own so it never shares a handle with CRUD callers.

use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::CoreError;
use crate::model::{GroupId, SystemId, SystemName, Watermark};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persisted columns of a monitored system. Class is not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SystemRow {
    pub id: SystemId,
    pub name: SystemName,
    pub created: NaiveDate,
    pub comments: String,
    pub watermark: Watermark,
    pub watched: bool,
}

/// Persisted columns of a group. Members are derived on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GroupRow {
    pub id: GroupId,
    pub created: NaiveDate,
    pub description: String,
}

pub(crate) struct PrimaryStore {
    conn: Connection,
    systems: String,
    groups: String,
}

impl PrimaryStore {
    pub(crate) fn open(config: &StorageConfig) -> Result<Self, CoreError> {
        let systems = checked_identifier(&config.systems_table)?;
        let groups = checked_identifier(&config.groups_table)?;

        let conn = Connection::open(&config.database)?;
        // The daemon and command-line invocations share the file.
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {systems} (
                id             INTEGER PRIMARY KEY,
                name           TEXT NOT NULL UNIQUE,
                created        TEXT NOT NULL,
                comments       TEXT NOT NULL DEFAULT '',
                last_kill_id   INTEGER NOT NULL,
                last_kill_time TEXT NOT NULL,
                watched        INTEGER NOT NULL DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS {groups} (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                created     TEXT NOT NULL,
                description TEXT NOT NULL
            );"
        ))?;
        debug!(database = %config.database.display(), "primary store opened");

        Ok(Self {
            conn,
            systems,
            groups,
        })
    }

    // ── Systems ──────────────────────────────────────────────────────

    /// All systems ordered by name.
    pub(crate) fn load_systems(&self) -> Result<Vec<SystemRow>, CoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name, created, comments, last_kill_id, last_kill_time, watched
             FROM {} ORDER BY name",
            self.systems
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(SystemRow {
                id: row.get(0)?,
                name: SystemName::new(row.get::<_, String>(1)?),
                created: row.get(2)?,
                comments: row.get(3)?,
                watermark: Watermark::new(row.get(4)?, row.get::<_, String>(5)?),
                watched: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub(crate) fn insert_system(&self, row: &SystemRow) -> Result<(), CoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, name, created, comments, last_kill_id, last_kill_time, watched)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                self.systems
            ),
            params![
                row.id,
                row.name.as_str(),
                row.created,
                row.comments,
                row.watermark.event_id,
                row.watermark.event_time,
                row.watched,
            ],
        )?;
        Ok(())
    }

    /// Returns `false` when no row matched.
    pub(crate) fn delete_system(&self, name: &SystemName) -> Result<bool, CoreError> {
        let n = self.conn.execute(
            &format!("DELETE FROM {} WHERE name = ?1", self.systems),
            params![name.as_str()],
        )?;
        Ok(n > 0)
    }

    pub(crate) fn update_watched(&self, name: &SystemName, watched: bool) -> Result<(), CoreError> {
        self.conn.execute(
            &format!("UPDATE {} SET watched = ?1 WHERE name = ?2", self.systems),
            params![watched, name.as_str()],
        )?;
        Ok(())
    }

    pub(crate) fn update_watched_and_comments(
        &self,
        name: &SystemName,
        watched: bool,
        comments: &str,
    ) -> Result<(), CoreError> {
        self.conn.execute(
            &format!(
                "UPDATE {} SET watched = ?1, comments = ?2 WHERE name = ?3",
                self.systems
            ),
            params![watched, comments, name.as_str()],
        )?;
        Ok(())
    }

    pub(crate) fn update_watermark(
        &self,
        id: SystemId,
        mark: &Watermark,
    ) -> Result<(), CoreError> {
        self.conn.execute(
            &format!(
                "UPDATE {} SET last_kill_id = ?1, last_kill_time = ?2 WHERE id = ?3",
                self.systems
            ),
            params![mark.event_id, mark.event_time, id],
        )?;
        Ok(())
    }

    pub(crate) fn clear_systems(&self) -> Result<(), CoreError> {
        self.conn
            .execute(&format!("DELETE FROM {}", self.systems), [])?;
        Ok(())
    }

    // ── Groups ───────────────────────────────────────────────────────

    /// All groups ordered by id.
    pub(crate) fn load_groups(&self) -> Result<Vec<GroupRow>, CoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, created, description FROM {} ORDER BY id",
            self.groups
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(GroupRow {
                id: row.get(0)?,
                created: row.get(1)?,
                description: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Insert a group and return its assigned id.
    pub(crate) fn insert_group(
        &self,
        created: NaiveDate,
        description: &str,
    ) -> Result<GroupId, CoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (created, description) VALUES (?1, ?2)",
                self.groups
            ),
            params![created, description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn update_group(&self, id: GroupId, description: &str) -> Result<bool, CoreError> {
        let n = self.conn.execute(
            &format!("UPDATE {} SET description = ?1 WHERE id = ?2", self.groups),
            params![description, id],
        )?;
        Ok(n > 0)
    }

    pub(crate) fn delete_group(&self, id: GroupId) -> Result<bool, CoreError> {
        let n = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.groups),
            params![id],
        )?;
        Ok(n > 0)
    }

    pub(crate) fn clear_groups(&self) -> Result<(), CoreError> {
        self.conn
            .execute(&format!("DELETE FROM {}", self.groups), [])?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn watermark_of(&self, name: &SystemName) -> Result<Option<Watermark>, CoreError> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT last_kill_id, last_kill_time FROM {} WHERE name = ?1",
                    self.systems
                ),
                params![name.as_str()],
                |row| Ok(Watermark::new(row.get(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?)
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
fn checked_identifier(name: &str) -> Result<String, CoreError> {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name.to_owned())
    } else {
        Err(CoreError::Config {
            message: format!("invalid table name '{name}'"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open_temp() -> (tempfile::TempDir, StorageConfig, PrimaryStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database: dir.path().join("test.db"),
            ..StorageConfig::default()
        };
        let store = PrimaryStore::open(&config).unwrap();
        (dir, config, store)
    }

    fn row(id: SystemId, name: &str) -> SystemRow {
        SystemRow {
            id,
            name: SystemName::new(name),
            created: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            comments: String::new(),
            watermark: Watermark::sentinel(),
            watched: true,
        }
    }

    #[test]
    fn systems_load_ordered_by_name() {
        let (_dir, _config, store) = open_temp();
        store.insert_system(&row(2, "J200000")).unwrap();
        store.insert_system(&row(1, "J100000")).unwrap();

        let names: Vec<String> = store
            .load_systems()
            .unwrap()
            .into_iter()
            .map(|r| r.name.to_string())
            .collect();
        assert_eq!(names, vec!["J100000", "J200000"]);
    }

    #[test]
    fn second_connection_sees_watermark_updates() {
        let (_dir, config, store) = open_temp();
        store.insert_system(&row(7, "J123456")).unwrap();

        let other = PrimaryStore::open(&config).unwrap();
        other
            .update_watermark(7, &Watermark::new(100, "2024-01-01 12:00:00"))
            .unwrap();

        let mark = store
            .watermark_of(&SystemName::new("J123456"))
            .unwrap()
            .unwrap();
        assert_eq!(mark, Watermark::new(100, "2024-01-01 12:00:00"));
    }

    #[test]
    fn update_and_delete_systems() {
        let (_dir, _config, store) = open_temp();
        let name = SystemName::new("J123456");
        store.insert_system(&row(7, "J123456")).unwrap();

        store.update_watched_and_comments(&name, false, "hi").unwrap();
        let loaded = store.load_systems().unwrap();
        assert!(!loaded[0].watched);
        assert_eq!(loaded[0].comments, "hi");

        assert!(store.delete_system(&name).unwrap());
        assert!(!store.delete_system(&name).unwrap());
    }

    #[test]
    fn group_ids_are_sequential() {
        let (_dir, _config, store) = open_temp();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let a = store.insert_group(date, "C3 HS").unwrap();
        let b = store.insert_group(date, "C5").unwrap();
        assert!(b > a);

        assert!(store.update_group(a, "C2").unwrap());
        assert!(store.delete_group(b).unwrap());
        let groups = store.load_groups().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].description, "C2");

        store.clear_groups().unwrap();
        assert!(store.load_groups().unwrap().is_empty());
    }

    #[test]
    fn rejects_unsafe_table_names() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database: dir.path().join("x.db"),
            systems_table: "wormholes; DROP".into(),
            ..StorageConfig::default()
        };
        assert!(matches!(
            PrimaryStore::open(&config),
            Err(CoreError::Config { .. })
        ));
    }
}
