// ── Core error types ──
//
// Recoverable failures surfaced by the registry, view-models and the
// action queue. Navigating to an identity that doesn't exist is NOT one of
// them: `UiFactory::make_item_vm` treats that as a broken caller contract.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Group not found: {identifier}")]
    GroupNotFound { identifier: String },

    #[error("Session not found: {identifier}")]
    SessionNotFound { identifier: String },

    /// The item a view-model was built for no longer resolves.
    #[error("{item} no longer exists")]
    ItemNotFound { item: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    // ── Action queue ─────────────────────────────────────────────────
    #[error("Action cancelled before it ran")]
    Cancelled,

    #[error("Action queue is shut down")]
    QueueClosed,

    // ── Snapshot I/O ─────────────────────────────────────────────────
    #[error("Invalid registry snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn device_not_found(identifier: impl ToString) -> Self {
        Self::DeviceNotFound {
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn group_not_found(identifier: impl ToString) -> Self {
        Self::GroupNotFound {
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn session_not_found(identifier: impl ToString) -> Self {
        Self::SessionNotFound {
            identifier: identifier.to_string(),
        }
    }
}
