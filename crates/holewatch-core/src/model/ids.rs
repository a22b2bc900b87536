// ── Core identity types ──
//
// SystemId and SystemName identify every tracked wormhole. Names are
// compared case-insensitively, so they are normalized once on the way in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// External solar system identifier assigned by the game (e.g. `31000005`).
pub type SystemId = u64;

/// Group identifier assigned sequentially by the primary store.
pub type GroupId = i64;

// ── SystemName ──────────────────────────────────────────────────────

/// Solar system name, normalized to trimmed uppercase (`J123456`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemName(String);

impl SystemName {
    /// Create a normalized name from any casing.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SystemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SystemName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for SystemName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for SystemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn system_name_normalizes_case() {
        assert_eq!(SystemName::new("j123456").as_str(), "J123456");
    }

    #[test]
    fn system_name_trims_whitespace() {
        assert_eq!(SystemName::new("  j000123 ").as_str(), "J000123");
    }

    #[test]
    fn system_name_from_str() {
        let name: SystemName = "j123456".parse().unwrap();
        assert_eq!(name.to_string(), "J123456");
        assert_eq!(name, SystemName::from("J123456"));
    }
}
