//! Configuration for holewatch.
//!
//! TOML sections layered under `HOLEWATCH_*` environment overrides, and
//! translation to `holewatch_core::MonitorConfig`. The binary adds its
//! `--config` flag on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use holewatch_core::{LimitPolicy, MonitorConfig, ReplicationConfig, StorageConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: Monitor,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub killboard: Killboard,
    #[serde(default)]
    pub scout: Scout,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub mirror: Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitPolicyKind {
    #[default]
    Cycling,
    Fixed,
}

/// `[monitor]`: check cycle timing and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Monitor {
    pub interval_secs: u64,
    pub api_wait_secs: u64,
    pub cycle_limit: u32,
    pub dedup_ttl_hours: u64,
    pub reports_active: bool,
    pub limit_policy: LimitPolicyKind,
    /// Killboard `limit` when `limit_policy = "fixed"`.
    pub fixed_limit: u32,
    pub pattern: String,
}

impl Default for Monitor {
    fn default() -> Self {
        Self {
            interval_secs: 600,
            api_wait_secs: 3,
            cycle_limit: 7,
            dedup_ttl_hours: 12,
            reports_active: true,
            limit_policy: LimitPolicyKind::Cycling,
            fixed_limit: 7,
            pattern: "^J000[0-9]{3}$".into(),
        }
    }
}

/// `[storage]`: primary SQLite store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Storage {
    pub database: PathBuf,
    pub systems_table: String,
    pub groups_table: String,
}

impl Default for Storage {
    fn default() -> Self {
        let defaults = StorageConfig::default();
        Self {
            database: defaults.database,
            systems_table: defaults.systems_table,
            groups_table: defaults.groups_table,
        }
    }
}

/// `[killboard]`: kill status API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Killboard {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for Killboard {
    fn default() -> Self {
        Self {
            base_url: "https://zkillboard.com".into(),
            user_agent: concat!("holewatch/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 30,
        }
    }
}

/// `[scout]`: live hub connection feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Scout {
    pub enabled: bool,
    pub base_url: String,
    pub hub: String,
}

impl Default for Scout {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.eve-scout.com".into(),
            hub: "Thera".into(),
        }
    }
}

/// `[catalog]`: static universe export.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Catalog {
    pub path: PathBuf,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catalog.json"),
        }
    }
}

/// `[mirror]`: secondary store replication.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Mirror {
    pub enabled: bool,
    pub queue_capacity: usize,
    pub workers: usize,
    /// Append-only JSONL file receiving mirror writes.
    pub journal: PathBuf,
}

impl Default for Mirror {
    fn default() -> Self {
        let defaults = ReplicationConfig::default();
        Self {
            enabled: true,
            queue_capacity: defaults.queue_capacity,
            workers: defaults.workers,
            journal: PathBuf::from("mirror.jsonl"),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "holewatch", "holewatch").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("holewatch");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load defaults, then the TOML file (`path` or the platform default),
/// then `HOLEWATCH_*` environment variables. `__` separates sections:
/// `HOLEWATCH_MONITOR__INTERVAL_SECS=60`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("HOLEWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

impl Config {
    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Translate to the core runtime configuration, rejecting values the
    /// check cycle cannot run with.
    pub fn monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        let m = &self.monitor;
        if m.interval_secs == 0 {
            return Err(invalid("monitor.interval_secs", "must be positive"));
        }
        if m.cycle_limit == 0 {
            return Err(invalid("monitor.cycle_limit", "must be positive"));
        }
        if m.pattern.trim().is_empty() {
            return Err(invalid("monitor.pattern", "must not be empty"));
        }
        if self.mirror.workers == 0 || self.mirror.queue_capacity == 0 {
            return Err(invalid("mirror", "workers and queue_capacity must be positive"));
        }
        let limit_policy = match m.limit_policy {
            LimitPolicyKind::Cycling => LimitPolicy::Cycling,
            LimitPolicyKind::Fixed if m.fixed_limit == 0 => {
                return Err(invalid("monitor.fixed_limit", "must be positive"));
            }
            LimitPolicyKind::Fixed => LimitPolicy::Fixed(m.fixed_limit),
        };

        Ok(MonitorConfig {
            storage: StorageConfig {
                database: self.storage.database.clone(),
                systems_table: self.storage.systems_table.clone(),
                groups_table: self.storage.groups_table.clone(),
            },
            replication: ReplicationConfig {
                queue_capacity: self.mirror.queue_capacity,
                workers: self.mirror.workers,
            },
            interval: Duration::from_secs(m.interval_secs),
            api_wait: Duration::from_secs(m.api_wait_secs),
            cycle_limit: m.cycle_limit,
            dedup_ttl: Duration::from_secs(m.dedup_ttl_hours.saturating_mul(3600)),
            limit_policy,
            pattern: m.pattern.clone(),
            reports_active: m.reports_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    fn load(path: &str) -> Result<Config, figment::Error> {
        load_config(Some(Path::new(path))).map_err(|e| figment::Error::from(e.to_string()))
    }

    #[test]
    fn defaults_translate_to_core_defaults() {
        let runtime = Config::default().monitor_config().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(runtime, MonitorConfig::default());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "holewatch.toml",
                r#"
                [monitor]
                interval_secs = 300
                limit_policy = "fixed"
                fixed_limit = 4

                [storage]
                database = "/var/lib/holewatch/wh.db"

                [scout]
                enabled = false
                "#,
            )?;
            let config = load("holewatch.toml")?;
            assert_eq!(config.monitor.interval_secs, 300);
            assert!(!config.scout.enabled);
            assert_eq!(config.scout.hub, "Thera");
            assert_eq!(config.monitor.cycle_limit, 7);

            let runtime = config.monitor_config().map_err(|e| e.to_string())?;
            assert_eq!(runtime.interval, Duration::from_secs(300));
            assert_eq!(runtime.limit_policy, LimitPolicy::Fixed(4));
            assert_eq!(
                runtime.storage.database,
                PathBuf::from("/var/lib/holewatch/wh.db")
            );
            Ok(())
        });
    }

    #[test]
    fn environment_wins_over_file() {
        Jail::expect_with(|jail| {
            jail.create_file("holewatch.toml", "[monitor]\ncycle_limit = 5\n")?;
            jail.set_env("HOLEWATCH_MONITOR__CYCLE_LIMIT", "3");
            jail.set_env("HOLEWATCH_MIRROR__ENABLED", "false");
            jail.set_env("HOLEWATCH_KILLBOARD__BASE_URL", "http://localhost:9000");

            let config = load("holewatch.toml")?;
            assert_eq!(config.monitor.cycle_limit, 3);
            assert!(!config.mirror.enabled);
            assert_eq!(config.killboard.base_url, "http://localhost:9000");
            Ok(())
        });
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_| {
            let config = load("nope.toml")?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = Config::default();
        config.monitor.interval_secs = 0;
        assert!(matches!(
            config.monitor_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "monitor.interval_secs"
        ));
    }

    #[test]
    fn renders_as_toml() {
        let rendered = Config::default().to_toml().unwrap_or_default();
        assert!(rendered.contains("[monitor]"));
        assert!(rendered.contains("limit_policy = \"cycling\""));
    }
}
