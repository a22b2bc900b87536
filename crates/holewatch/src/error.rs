//! CLI error types with miette diagnostics.
//!
//! Maps core, config and API errors into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use holewatch_config::ConfigError;
use holewatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const STORAGE: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────
    #[error("{entity_type} {identifier} is not in the list")]
    #[diagnostic(
        code(holewatch::not_found),
        help("Run: holewatch {list_command} to see what is tracked")
    )]
    NotFound {
        entity_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(holewatch::conflict),
        help("Check the name with: holewatch roster info <NAME>")
    )]
    Conflict { message: String },

    // ── Storage / catalog ────────────────────────────────────────────
    #[error("Primary store error: {message}")]
    #[diagnostic(
        code(holewatch::storage),
        help("Check [storage] database in your config, or pass --database.")
    )]
    Storage { message: String },

    #[error("Catalog error: {message}")]
    #[diagnostic(
        code(holewatch::catalog),
        help("Point [catalog] path or --catalog at a JSON export of the universe.")
    )]
    Catalog { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(holewatch::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(holewatch::confirmation_required),
        help("Re-run with --yes (-y).")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(holewatch::config),
        help("Inspect the effective configuration with: holewatch config show")
    )]
    Config(#[from] ConfigError),

    // ── Network ──────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(holewatch::api))]
    Api(#[from] holewatch_api::Error),

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(holewatch::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not encode output: {0}")]
    #[diagnostic(code(holewatch::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Storage { .. } => exit_code::STORAGE,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                list_command: if entity_type == "Generic" {
                    "groups list".into()
                } else {
                    "roster list".into()
                },
                entity_type,
                identifier,
            },
            err @ (CoreError::UnknownSystem { .. } | CoreError::AlreadyTracked { .. }) => {
                Self::Conflict {
                    message: err.to_string(),
                }
            }
            CoreError::Storage(e) => Self::Storage {
                message: e.to_string(),
            },
            CoreError::Catalog { message } => Self::Catalog { message },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}
