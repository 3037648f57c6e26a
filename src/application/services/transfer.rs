//! Payload transporter: one scp push of the sample into the guest.
//!
//! The caller verifies the local file exists before invoking this stage; a
//! transfer failure mid-workflow risks an inconsistent guest that only a
//! revert can fix, so any non-zero exit is fatal for the run.

use std::path::Path;
use std::time::Duration;

use crate::application::ports::CommandRunner;
use crate::application::services::failure_detail;
use crate::domain::error::StageError;
use crate::domain::vm::SshEndpoint;

/// Timeout for the scp push. Payloads can be large; transfers must not sit
/// under the short hypervisor-command timeout.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);

/// Copy `local` into the guest at `remote`.
///
/// # Errors
///
/// Returns `StageError::Transfer` if scp cannot be spawned, the local path
/// is not valid UTF-8, or the transfer exits non-zero. No retries.
pub async fn copy_to_guest(
    runner: &impl CommandRunner,
    endpoint: &SshEndpoint,
    local: &Path,
    remote: &str,
) -> Result<(), StageError> {
    let local = local.to_str().ok_or_else(|| StageError::Transfer {
        details: format!("local path is not valid UTF-8: {}", local.display()),
    })?;
    let port = endpoint.port.to_string();
    let dest = format!("{}:{remote}", endpoint.principal());

    let result = runner
        .run_with_timeout(
            "scp",
            &[
                "-P",
                &port,
                "-o",
                "StrictHostKeyChecking=no",
                local,
                &dest,
            ],
            TRANSFER_TIMEOUT,
        )
        .await;
    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => Err(StageError::Transfer {
            details: failure_detail(&out),
        }),
        Err(e) => Err(StageError::Transfer {
            details: format!("{e:#}"),
        }),
    }
}
