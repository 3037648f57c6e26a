//! VM identity types: hypervisor backend, target instance, SSH endpoint.
//!
//! Validation happens at construction so that no value drawn from the
//! command line reaches a command argument vector unchecked.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::TargetError;

/// Name of the baseline snapshot every analysis VM must carry.
pub const SNAPSHOT_NAME: &str = "clean";

/// Host through which the guest's forwarded SSH port is reached.
pub const GUEST_HOST: &str = "127.0.0.1";

// Patterns are compile-time constants and will not fail to compile.
#[allow(clippy::expect_used)]
static VM_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("valid regex"));

#[allow(clippy::expect_used)]
static GUEST_USER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_-]*$").expect("valid regex"));

#[allow(clippy::expect_used)]
static GUEST_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/[A-Za-z0-9_./-]*$").expect("valid regex"));

// ── Backend ───────────────────────────────────────────────────────────────────

/// Hypervisor control-plane dialect. Closed set: adding a backend is a
/// compile-time-checked exhaustive match, not a string branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    VirtualBox,
    Kvm,
}

impl Backend {
    /// Canonical CLI spelling of the backend.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VirtualBox => "virtualbox",
            Self::Kvm => "kvm",
        }
    }
}

impl FromStr for Backend {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "virtualbox" => Ok(Self::VirtualBox),
            "kvm" => Ok(Self::Kvm),
            other => Err(TargetError::UnsupportedBackend(other.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── VmTarget ──────────────────────────────────────────────────────────────────

/// Which hypervisor dialect and which named VM instance to operate on.
/// Immutable for the duration of one analysis run.
#[derive(Debug, Clone)]
pub struct VmTarget {
    pub backend: Backend,
    name: String,
}

impl VmTarget {
    /// Build a target, validating the VM name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains characters outside
    /// the allowed set.
    pub fn new(backend: Backend, name: &str) -> Result<Self, TargetError> {
        validate_vm_name(name)?;
        Ok(Self {
            backend,
            name: name.to_string(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

// ── SshEndpoint ───────────────────────────────────────────────────────────────

/// Guest SSH access point. Every remote-facing stage consumes this.
#[derive(Debug, Clone)]
pub struct SshEndpoint {
    user: String,
    host: String,
    pub port: u16,
}

impl SshEndpoint {
    /// Build an endpoint for the guest user on the forwarded local port.
    ///
    /// # Errors
    ///
    /// Returns an error if the user name fails validation.
    pub fn for_guest(user: &str, port: u16) -> Result<Self, TargetError> {
        validate_guest_user(user)?;
        Ok(Self {
            user: user.to_string(),
            host: GUEST_HOST.to_string(),
            port,
        })
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The `user@host` principal used on ssh/scp command lines.
    #[must_use]
    pub fn principal(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

// ── Validators ────────────────────────────────────────────────────────────────

/// Validates a VM name drawn from caller input.
///
/// # Errors
///
/// Returns an error if the name would not survive unquoted on a command line.
pub fn validate_vm_name(name: &str) -> Result<(), TargetError> {
    if VM_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(TargetError::InvalidVmName(name.to_string()))
    }
}

/// Validates a guest user name.
///
/// # Errors
///
/// Returns an error if the name is not a plain lowercase Unix user name.
pub fn validate_guest_user(user: &str) -> Result<(), TargetError> {
    if GUEST_USER_RE.is_match(user) {
        Ok(())
    } else {
        Err(TargetError::InvalidGuestUser(user.to_string()))
    }
}

/// Validates a guest-side directory or file path before it is embedded in a
/// remote command.
///
/// # Errors
///
/// Returns an error if the path is relative or carries shell metacharacters.
pub fn validate_guest_path(path: &str) -> Result<(), TargetError> {
    if GUEST_PATH_RE.is_match(path) {
        Ok(())
    } else {
        Err(TargetError::InvalidGuestPath(path.to_string()))
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
