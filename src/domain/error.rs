//! Typed domain error enums and the process exit-code contract.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`. All error
//! types implement `thiserror::Error` and convert to `anyhow::Error` via
//! the `?` operator.

use thiserror::Error;

/// Exit code for argument and validation errors (clap uses the same code
/// for its own usage errors).
pub const EXIT_USAGE: i32 = 2;
/// Exit code for an unsupported backend or a failed VM start.
pub const EXIT_START: i32 = 3;
/// Exit code when the guest never became reachable over SSH.
pub const EXIT_UNREACHABLE: i32 = 5;
/// Exit code for a failed payload transfer.
pub const EXIT_TRANSFER: i32 = 6;
/// Exit code for a failed revert — the VM was left in a dirty state.
pub const EXIT_REVERT: i32 = 7;

// ── Target errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating caller input, before any VM side effect.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("unsupported backend '{0}' (valid backends: virtualbox, kvm)")]
    UnsupportedBackend(String),

    #[error("invalid VM name '{0}': must match ^[A-Za-z0-9][A-Za-z0-9_.-]*$")]
    InvalidVmName(String),

    #[error("invalid guest user '{0}': must match ^[a-z_][a-z0-9_-]*$")]
    InvalidGuestUser(String),

    #[error("invalid guest path '{0}': must be absolute with no shell metacharacters")]
    InvalidGuestPath(String),

    #[error("payload file not found: {0}")]
    MissingPayload(String),
}

impl TargetError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnsupportedBackend(_) => EXIT_START,
            _ => EXIT_USAGE,
        }
    }
}

// ── Stage errors ──────────────────────────────────────────────────────────────

/// Errors raised by the workflow stages. Trigger and collection failures are
/// deliberately absent: those stages warn and continue.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("failed to start VM: {details}")]
    Start { details: String },

    #[error("guest SSH did not become reachable within {timeout_secs}s")]
    Unreachable { timeout_secs: u64 },

    #[error("payload transfer to guest failed: {details}")]
    Transfer { details: String },

    #[error("failed to revert VM to clean snapshot: {details}")]
    Revert { details: String },
}

impl StageError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Start { .. } => EXIT_START,
            Self::Unreachable { .. } => EXIT_UNREACHABLE,
            Self::Transfer { .. } => EXIT_TRANSFER,
            Self::Revert { .. } => EXIT_REVERT,
        }
    }
}

/// Map any error chain to the process exit code it carries, falling back
/// to 1 for errors outside the contract.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<StageError>() {
        return e.exit_code();
    }
    if let Some(e) = err.downcast_ref::<TargetError>() {
        return e.exit_code();
    }
    1
}
