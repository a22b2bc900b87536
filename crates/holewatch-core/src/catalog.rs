// ── Static universe catalog ──
//
// Read-only lookup of system ids, classes and statics, plus the
// description-to-systems derivation used by generic groups.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::SystemId;

const SECURITY_CLASSES: [&str; 3] = ["HS", "LS", "NS"];

/// Result of resolving a group description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Derivation {
    /// Human-readable summary of the filters that were applied.
    pub info: String,
    pub codes: BTreeSet<String>,
}

/// A wormhole static: a connection that always respawns from its system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticInfo {
    pub code: String,
    /// Destination class (`HS`, `LS`, `NS`, `C1`..`C6`, ...).
    pub leads_to: String,
    #[serde(default)]
    pub lifetime_hours: Option<u32>,
    #[serde(default)]
    pub max_mass_kg: Option<u64>,
    #[serde(default)]
    pub jump_mass_kg: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub id: SystemId,
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub statics: Vec<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub constellation: Option<String>,
    #[serde(default)]
    pub planets: Option<u32>,
}

/// Read-only lookups the watchlist needs from the static data export.
///
/// All name arguments are matched case-insensitively.
pub trait Catalog: Send + Sync {
    fn system_id(&self, name: &str) -> Option<SystemId>;

    fn class_of(&self, name: &str) -> Option<String>;

    fn describe(&self, name: &str) -> Option<String>;

    /// Resolve a free-text description into a set of system names.
    ///
    /// Must be deterministic: the same description always yields the
    /// same set for an unchanged catalog.
    fn derive(&self, description: &str) -> Derivation;

    fn static_info(&self, code: &str) -> Option<StaticInfo>;

    fn is_known(&self, name: &str) -> bool {
        self.system_id(name).is_some()
    }
}

// ── JSON-backed catalog ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    systems: Vec<SystemInfo>,
    #[serde(default)]
    statics: Vec<StaticInfo>,
}

/// Catalog loaded from a JSON export:
/// `{ "systems": [SystemInfo], "statics": [StaticInfo] }`.
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    systems: BTreeMap<String, SystemInfo>,
    statics: BTreeMap<String, StaticInfo>,
}

impl JsonCatalog {
    pub fn from_parts(systems: Vec<SystemInfo>, statics: Vec<StaticInfo>) -> Self {
        Self {
            systems: systems
                .into_iter()
                .map(|mut s| {
                    s.name = s.name.to_uppercase();
                    (s.name.clone(), s)
                })
                .collect(),
            statics: statics
                .into_iter()
                .map(|mut s| {
                    s.code = s.code.to_uppercase();
                    s.leads_to = s.leads_to.to_uppercase();
                    (s.code.clone(), s)
                })
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let file: CatalogFile = serde_json::from_str(json).map_err(|e| CoreError::Catalog {
            message: format!("invalid catalog: {e}"),
        })?;
        Ok(Self::from_parts(file.systems, file.statics))
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path).map_err(|e| CoreError::Catalog {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    fn system(&self, name: &str) -> Option<&SystemInfo> {
        self.systems.get(&name.trim().to_uppercase())
    }

    fn is_class_token(&self, token: &str) -> bool {
        !SECURITY_CLASSES.contains(&token) && self.systems.values().any(|s| s.class == token)
    }

    fn is_destination_token(&self, token: &str) -> bool {
        self.statics.contains_key(token)
            || SECURITY_CLASSES.contains(&token)
            || self.statics.values().any(|s| s.leads_to == token)
    }

    /// A static filter is satisfied by a static with that code or one
    /// leading to that class.
    fn has_static(&self, system: &SystemInfo, filter: &str) -> bool {
        system.statics.iter().any(|code| {
            code.eq_ignore_ascii_case(filter)
                || self
                    .statics
                    .get(&code.to_uppercase())
                    .is_some_and(|s| s.leads_to == filter)
        })
    }
}

impl Catalog for JsonCatalog {
    fn system_id(&self, name: &str) -> Option<SystemId> {
        self.system(name).map(|s| s.id).filter(|id| *id > 0)
    }

    fn class_of(&self, name: &str) -> Option<String> {
        self.system(name).map(|s| s.class.clone())
    }

    fn describe(&self, name: &str) -> Option<String> {
        let system = self.system(name)?;
        let mut out = format!("*{}* [{}]", system.name, system.class);
        if let Some(ref region) = system.region {
            let _ = write!(out, " {region}");
            if let Some(ref constellation) = system.constellation {
                let _ = write!(out, " / {constellation}");
            }
        }
        if !system.statics.is_empty() {
            let statics: Vec<String> = system
                .statics
                .iter()
                .map(|code| match self.statics.get(&code.to_uppercase()) {
                    Some(info) => format!("{} ({})", info.code, info.leads_to),
                    None => code.to_uppercase(),
                })
                .collect();
            let _ = write!(out, ", statics: {}", statics.join(", "));
        }
        if let Some(planets) = system.planets {
            let _ = write!(out, ", planets: {planets}");
        }
        Some(out)
    }

    fn derive(&self, description: &str) -> Derivation {
        let tokens: Vec<String> = description
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_uppercase)
            .collect();

        let mut named = BTreeSet::new();
        let mut class_filter: Option<String> = None;
        let mut static_filters: Vec<String> = Vec::new();
        let mut ignored: Vec<String> = Vec::new();

        for token in tokens {
            if self.systems.contains_key(&token) {
                named.insert(token);
            } else if class_filter.is_none() && self.is_class_token(&token) {
                class_filter = Some(token);
            } else if self.is_destination_token(&token) || self.is_class_token(&token) {
                static_filters.push(token);
            } else {
                ignored.push(token);
            }
        }

        let mut codes = named.clone();
        if class_filter.is_some() || !static_filters.is_empty() {
            codes.extend(
                self.systems
                    .values()
                    .filter(|s| class_filter.as_ref().is_none_or(|c| s.class == *c))
                    .filter(|s| static_filters.iter().all(|f| self.has_static(s, f)))
                    .map(|s| s.name.clone()),
            );
        }

        let mut info = format!("{} systems match", codes.len());
        if let Some(ref class) = class_filter {
            let _ = write!(info, ", class {class}");
        }
        if !static_filters.is_empty() {
            let _ = write!(info, ", statics {}", static_filters.join("+"));
        }
        if !named.is_empty() {
            let named: Vec<&str> = named.iter().map(String::as_str).collect();
            let _ = write!(info, ", named {}", named.join(" "));
        }
        if !ignored.is_empty() {
            let _ = write!(info, " (ignored: {})", ignored.join(" "));
        }

        Derivation { info, codes }
    }

    fn static_info(&self, code: &str) -> Option<StaticInfo> {
        self.statics.get(&code.trim().to_uppercase()).cloned()
    }
}
