// ── Core error types ──
//
// User-facing errors from holewatch-core. CRUD operations surface these
// as short messages; the check cycle never returns them, it logs and
// moves on to the next system.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Roster / group errors ────────────────────────────────────────
    #[error("{entity_type} {identifier} is not in the list")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("{name} - not a valid wormhole")]
    UnknownSystem { name: String },

    #[error("{name} - already in the list")]
    AlreadyTracked { name: String },

    // ── Storage errors ───────────────────────────────────────────────
    #[error("Primary store error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Catalog error: {message}")]
    Catalog { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn system_not_found(name: &str) -> Self {
        Self::NotFound {
            entity_type: "Wormhole".into(),
            identifier: name.into(),
        }
    }

    pub(crate) fn group_not_found(id: i64) -> Self {
        Self::NotFound {
            entity_type: "Generic".into(),
            identifier: format!("#{id}"),
        }
    }

    /// `true` for an unknown or duplicate system name.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::UnknownSystem { .. } | Self::AlreadyTracked { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_short_and_human_readable() {
        assert_eq!(
            CoreError::AlreadyTracked {
                name: "J123456".into()
            }
            .to_string(),
            "J123456 - already in the list"
        );
        assert_eq!(
            CoreError::system_not_found("J123456").to_string(),
            "Wormhole J123456 is not in the list"
        );
        assert_eq!(
            CoreError::group_not_found(7).to_string(),
            "Generic #7 is not in the list"
        );
    }

    #[test]
    fn conflict_classification() {
        assert!(CoreError::UnknownSystem { name: "X".into() }.is_conflict());
        assert!(!CoreError::system_not_found("X").is_conflict());
        assert!(CoreError::group_not_found(1).is_not_found());
    }
}
