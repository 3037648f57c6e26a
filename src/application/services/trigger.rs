//! Remote trigger: launch the guest-side analysis agent, fire-and-forget.
//!
//! The agent is started detached with its output redirected into the guest
//! output directory, and the timeout is passed through so the agent itself
//! terminates the analyzed binary. The launch command's exit status is not
//! a reliable signal of the agent's eventual success, so callers log a
//! failure here without aborting the run.

use anyhow::{Result, bail};

use crate::application::ports::CommandRunner;
use crate::application::services::failure_detail;
use crate::domain::vm::SshEndpoint;

/// Compose the detached launch command executed inside the guest.
///
/// The agent lives in the guest user's home; stdout and stderr go to a log
/// file next to the reports so launch problems are diagnosable post-run.
#[must_use]
pub fn agent_launch_command(
    endpoint: &SshEndpoint,
    remote_file: &str,
    output_dir: &str,
    timeout_secs: u32,
) -> String {
    format!(
        "nohup python3 /home/{user}/agent/agent.py --file {remote_file} \
         --output {output_dir} --timeout {timeout_secs} \
         > {output_dir}/agent-run.log 2>&1 &",
        user = endpoint.user(),
    )
}

/// Launch the analysis agent in the guest, detached.
///
/// # Errors
///
/// Returns an error only when the launch command itself failed to start the
/// detached process. Non-fatal by contract: the caller logs and proceeds.
pub async fn launch_agent(
    runner: &impl CommandRunner,
    endpoint: &SshEndpoint,
    remote_file: &str,
    output_dir: &str,
    timeout_secs: u32,
) -> Result<()> {
    let port = endpoint.port.to_string();
    let principal = endpoint.principal();
    let remote_cmd = agent_launch_command(endpoint, remote_file, output_dir, timeout_secs);

    let result = runner
        .run(
            "ssh",
            &[
                "-p",
                &port,
                "-o",
                "StrictHostKeyChecking=no",
                &principal,
                &remote_cmd,
            ],
        )
        .await;
    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => bail!("agent launch command failed: {}", failure_detail(&out)),
        Err(e) => bail!("agent launch command failed: {e:#}"),
    }
}
