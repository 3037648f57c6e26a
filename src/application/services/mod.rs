//! Workflow services — one module per stage of the analysis run.
//!
//! Every service consumes the `CommandRunner` port as its only side-effecting
//! primitive. Imports only from `crate::domain` and `crate::application::ports`.

pub mod analysis;
pub mod collect;
pub mod lifecycle;
pub mod probe;
pub mod transfer;
pub mod trigger;

#[cfg(test)]
pub(crate) mod test_support;

use std::process::Output;

/// Render a failed command's stderr for an error message, falling back to
/// the exit code when the tool wrote nothing.
pub(crate) fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exit code {}", output.status.code().unwrap_or(-1))
    } else {
        stderr.to_string()
    }
}
