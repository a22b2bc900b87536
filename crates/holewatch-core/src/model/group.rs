// ── Generic wormhole groups ──

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::ids::GroupId;

/// A free-text order ("C3 with HS static") and the systems it currently
/// resolves to through the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityGroup {
    pub id: GroupId,
    pub created: NaiveDate,
    pub description: String,
    /// Always the catalog's derivation of `description`; recomputed on edit.
    pub members: BTreeSet<String>,
}

impl EntityGroup {
    pub fn contains(&self, code: &str) -> bool {
        self.members.contains(code)
    }
}

impl fmt::Display for EntityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generic *#{}* [{}] {}",
            self.id,
            self.created.format("%Y-%m-%d"),
            self.description
        )
    }
}
