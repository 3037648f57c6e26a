//! SSH reachability prober: bounded polling until the guest answers.
//!
//! Polling, not event-driven — the guest's sshd has no way to push a ready
//! signal. Each attempt is a minimal remote no-op with a short connect
//! timeout so a black-hole network path cannot stall the whole budget.

use std::time::Duration;

use crate::application::ports::CommandRunner;
use crate::domain::vm::SshEndpoint;

/// Fixed backoff between probe attempts.
pub const PROBE_BACKOFF: Duration = Duration::from_secs(2);

/// Per-attempt TCP connect timeout passed to ssh.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Hard cap on one attempt, including auth and the remote no-op. Guards
/// against paths where the connection opens but the session stalls.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

/// Poll the guest until a remote `echo ok` succeeds or `budget` elapses.
///
/// Returns `true` as soon as one attempt succeeds. At least one attempt is
/// made even when `budget` is below one backoff interval; a zero budget
/// probes exactly once. Spawn failures count as failed attempts.
pub async fn wait_for_reachable(
    runner: &impl CommandRunner,
    endpoint: &SshEndpoint,
    budget: Duration,
) -> bool {
    let connect_opt = format!("ConnectTimeout={CONNECT_TIMEOUT_SECS}");
    let port = endpoint.port.to_string();
    let principal = endpoint.principal();

    let mut waited = Duration::ZERO;
    loop {
        let attempt = runner
            .run_with_timeout(
                "ssh",
                &[
                    "-o",
                    &connect_opt,
                    "-o",
                    "StrictHostKeyChecking=no",
                    "-p",
                    &port,
                    &principal,
                    "echo",
                    "ok",
                ],
                ATTEMPT_TIMEOUT,
            )
            .await;
        if matches!(attempt, Ok(ref out) if out.status.success()) {
            return true;
        }
        if waited >= budget {
            tracing::warn!(
                "guest SSH on {principal}:{port} not reachable after {}s",
                budget.as_secs()
            );
            return false;
        }
        tokio::time::sleep(PROBE_BACKOFF).await;
        waited += PROBE_BACKOFF;
    }
}
