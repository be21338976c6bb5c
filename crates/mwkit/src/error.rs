//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use mwkit_config::ConfigError;
use mwkit_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CANCELLED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(mwkit::not_found),
        help("Run: mwkit {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Device operations ────────────────────────────────────────────
    #[error("Operation failed: {message}")]
    #[diagnostic(code(mwkit::operation_failed))]
    OperationFailed { message: String },

    #[error("Action did not run: {reason}")]
    #[diagnostic(
        code(mwkit::cancelled),
        help("The action queue shut down before the action was picked up.")
    )]
    Cancelled { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mwkit::validation))]
    Validation { field: String, reason: String },

    // ── Registry file ────────────────────────────────────────────────
    #[error("Could not read registry {path}")]
    #[diagnostic(
        code(mwkit::registry),
        help("The registry file must be a JSON snapshot with devices, groups and sessions.")
    )]
    Registry {
        path: String,
        #[source]
        source: CoreError,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(mwkit::config), help("Check the config file: mwkit config path"))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(mwkit::render))]
    Render(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(mwkit::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Cancelled { .. } => exit_code::CANCELLED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices".into(),
            },

            CoreError::GroupNotFound { identifier } => CliError::NotFound {
                resource_type: "group".into(),
                identifier,
                list_command: "groups".into(),
            },

            CoreError::SessionNotFound { identifier } => CliError::NotFound {
                resource_type: "session".into(),
                identifier,
                list_command: "sessions".into(),
            },

            CoreError::ItemNotFound { item } => CliError::NotFound {
                resource_type: "item".into(),
                identifier: item,
                list_command: "devices".into(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::OperationFailed { message } => CliError::OperationFailed { message },

            CoreError::Cancelled => CliError::Cancelled {
                reason: "cancelled while queued".into(),
            },

            CoreError::QueueClosed => CliError::Cancelled {
                reason: "action queue is shut down".into(),
            },

            CoreError::Io(e) => CliError::Io(e),

            CoreError::Snapshot(e) => CliError::Internal(e.to_string()),

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

/// Wrap a failure to read or write the registry file.
pub fn registry_error(path: &std::path::Path, source: CoreError) -> CliError {
    CliError::Registry {
        path: path.display().to_string(),
        source,
    }
}
