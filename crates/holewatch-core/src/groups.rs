// ── Generic group registry ──
//
// A group is a stored free-text description plus the member set the
// catalog derives from it. Members are never persisted; they are derived
// on load and recomputed on every edit.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::CoreError;
use crate::model::{EntityGroup, GroupId, SystemId, SystemName};
use crate::replication::{MirrorOp, Replicator};
use crate::shortlink::FormattedText;
use crate::store::{self, EntityCollection, GroupRow, SharedStore};

/// Zero-padded so key order is id order.
fn key(id: GroupId) -> String {
    format!("grp:{id:012}")
}

pub struct GroupRegistry {
    groups: EntityCollection<EntityGroup>,
    store: SharedStore,
    catalog: Arc<dyn Catalog>,
    replicator: Replicator,
}

impl GroupRegistry {
    pub(crate) fn new(
        store: SharedStore,
        catalog: Arc<dyn Catalog>,
        replicator: Replicator,
    ) -> Self {
        Self {
            groups: EntityCollection::new(),
            store,
            catalog,
            replicator,
        }
    }

    pub(crate) fn load(&self) -> Result<usize, CoreError> {
        let guard = store::lock(&self.store);
        let rows = guard.load_groups()?;
        let count = rows.len();
        self.groups.replace_all(rows.into_iter().map(|row| {
            let group = self.derive_group(row).0;
            (key(group.id), group)
        }));
        debug!(count, "groups loaded");
        Ok(count)
    }

    /// Create a group. Returns it with the derivation summary.
    pub fn add(&self, description: &str) -> Result<(Arc<EntityGroup>, String), CoreError> {
        let text = FormattedText::new(description);
        let (group, derivation_info) = {
            let guard = store::lock(&self.store);
            let created = Utc::now().date_naive();
            let id = guard.insert_group(created, &text.plain)?;
            let (group, derivation_info) = self.derive_group(GroupRow {
                id,
                created,
                description: text.plain,
            });
            self.groups.upsert(key(id), group.clone());
            (Arc::new(group), derivation_info)
        };

        info!(group = group.id, members = group.members.len(), "group added");
        self.replicator.enqueue(MirrorOp::AddGroup {
            group_id: group.id,
            description: text.html,
            member_ids: self.member_ids(&group.members),
        });
        Ok((group, derivation_info))
    }

    pub fn remove(&self, id: GroupId) -> Result<(), CoreError> {
        let removed = {
            let guard = store::lock(&self.store);
            let Some(current) = self.groups.get(&key(id)) else {
                return Err(CoreError::group_not_found(id));
            };
            guard.delete_group(id)?;
            self.groups.remove(&key(id));
            current
        };

        info!(group = id, "group removed");
        self.replicator.enqueue(MirrorOp::DeleteGroup {
            group_id: id,
            member_ids: self.member_ids(&removed.members),
        });
        Ok(())
    }

    /// Replace the description and re-derive the members.
    pub fn edit(
        &self,
        id: GroupId,
        description: &str,
    ) -> Result<(Arc<EntityGroup>, String), CoreError> {
        let text = FormattedText::new(description);
        let (old, group, derivation_info) = {
            let guard = store::lock(&self.store);
            let Some(old) = self.groups.get(&key(id)) else {
                return Err(CoreError::group_not_found(id));
            };
            guard.update_group(id, &text.plain)?;
            let (group, derivation_info) = self.derive_group(GroupRow {
                id,
                created: old.created,
                description: text.plain,
            });
            self.groups.upsert(key(id), group.clone());
            (old, Arc::new(group), derivation_info)
        };

        info!(group = id, members = group.members.len(), "group edited");
        self.replicator.enqueue(MirrorOp::ReplaceGroup {
            group_id: id,
            old_member_ids: self.member_ids(&old.members),
            description: text.html,
            member_ids: self.member_ids(&group.members),
        });
        Ok((group, derivation_info))
    }

    pub fn get(&self, id: GroupId) -> Option<Arc<EntityGroup>> {
        self.groups.get(&key(id))
    }

    /// All groups in id (insertion) order.
    pub fn list(&self) -> Arc<Vec<Arc<EntityGroup>>> {
        self.groups.snapshot()
    }

    pub fn members_of(&self, id: GroupId) -> Option<BTreeSet<String>> {
        self.get(id).map(|g| g.members.clone())
    }

    /// Ids of every group whose member set contains `code`, ascending.
    pub fn containing(&self, code: &str) -> Vec<GroupId> {
        let code = SystemName::new(code);
        self.list()
            .iter()
            .filter(|g| g.contains(code.as_str()))
            .map(|g| g.id)
            .collect()
    }

    /// Empty the registry and the primary store. The mirror is left as is.
    pub fn clear(&self) -> Result<(), CoreError> {
        let guard = store::lock(&self.store);
        guard.clear_groups()?;
        self.groups.clear();
        info!("groups cleared");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.len() == 0
    }

    fn derive_group(&self, row: GroupRow) -> (EntityGroup, String) {
        let derivation = self.catalog.derive(&row.description);
        let group = EntityGroup {
            id: row.id,
            created: row.created,
            description: row.description,
            members: derivation.codes,
        };
        (group, derivation.info)
    }

    fn member_ids(&self, members: &BTreeSet<String>) -> Vec<SystemId> {
        members
            .iter()
            .filter_map(|code| self.catalog.system_id(code))
            .collect()
    }
}
