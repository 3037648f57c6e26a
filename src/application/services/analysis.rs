//! Orchestration driver: the end-to-end analysis workflow.
//!
//! Sequence: validate -> start -> wait for SSH -> transfer payload ->
//! launch agent -> collect reports -> revert. Argument and backend errors
//! short-circuit before any VM state change; once the VM is `Running`,
//! revert runs on every exit path, and a revert failure outranks whatever
//! happened before it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::application::services::lifecycle::LifecycleController;
use crate::application::services::{collect, probe, transfer, trigger};
use crate::domain::error::{StageError, TargetError};
use crate::domain::vm::{Backend, GUEST_HOST, SshEndpoint, VmTarget, validate_guest_path};

/// Caller input for one analysis run. Read-only for the run's duration.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Hypervisor backend, parsed from the raw CLI string at workflow start
    /// so an unsupported value is a distinct error before any side effect.
    pub backend: String,
    pub vm_name: String,
    /// Local path of the sample to detonate.
    pub payload: PathBuf,
    pub guest_user: String,
    pub ssh_port: u16,
    /// Total budget for the guest to become reachable over SSH.
    pub ssh_timeout: Duration,
    /// Passed through to the guest agent, which self-terminates the sample.
    pub agent_timeout_secs: u32,
    /// Pause between agent launch and report collection. The launch is
    /// fire-and-forget, so this is the only knob controlling how much of
    /// the agent's run the collection can observe.
    pub collect_delay: Duration,
    /// Guest directory receiving the payload; `/home/<user>/incoming` when
    /// unset.
    pub guest_incoming: Option<String>,
    /// Guest directory the agent writes reports into; `/home/<user>/out`
    /// when unset.
    pub guest_output: Option<String>,
    /// Local directory reports are pulled into.
    pub reports_dir: PathBuf,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub backend: Backend,
    pub vm_name: String,
    pub reports_dir: PathBuf,
    /// Report artifacts present locally after collection, sorted by name.
    pub reports: Vec<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Run the full analysis workflow against one VM.
///
/// # Errors
///
/// Returns `TargetError` for input rejected before any side effect and
/// `StageError` for workflow failures, each carrying its contract exit
/// code. Trigger and collection failures are reported through `reporter`
/// and never fail the run.
pub async fn run(
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
    req: &AnalysisRequest,
) -> Result<AnalysisOutcome> {
    let started_at = Utc::now();

    // Argument and backend validation: fatal before any VM state change.
    let backend: Backend = req.backend.parse()?;
    let target = VmTarget::new(backend, &req.vm_name)?;
    let endpoint = SshEndpoint::for_guest(&req.guest_user, req.ssh_port)?;
    let remote = GuestPaths::resolve(req, &endpoint)?;

    let mut vm = LifecycleController::new(&target, runner);
    reporter.step(&format!("starting VM '{}' ({backend})", target.name()));
    vm.start().await?;
    reporter.success(&format!("VM '{}' running", target.name()));

    let staged = run_guest_stages(runner, reporter, req, &endpoint, &remote).await;

    reporter.step("reverting VM to clean snapshot");
    let reverted = vm.revert().await;
    if reverted.is_ok() {
        reporter.success("VM reverted");
    }

    // A revert failure is the run's highest-priority error; a successful
    // revert never masks an earlier stage failure.
    reverted?;
    staged?;

    Ok(AnalysisOutcome {
        backend,
        vm_name: target.name().to_string(),
        reports: collect::collected_reports(&req.reports_dir),
        reports_dir: req.reports_dir.clone(),
        started_at,
        finished_at: Utc::now(),
    })
}

/// Guest-side locations for one run, validated before use.
struct GuestPaths {
    payload: String,
    output_dir: String,
}

impl GuestPaths {
    fn resolve(req: &AnalysisRequest, endpoint: &SshEndpoint) -> Result<Self, TargetError> {
        if !req.payload.is_file() {
            return Err(TargetError::MissingPayload(req.payload.display().to_string()));
        }
        let filename = req
            .payload
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TargetError::MissingPayload(req.payload.display().to_string()))?;

        let incoming = req
            .guest_incoming
            .clone()
            .unwrap_or_else(|| format!("/home/{}/incoming", endpoint.user()));
        let output_dir = req
            .guest_output
            .clone()
            .unwrap_or_else(|| format!("/home/{}/out", endpoint.user()));
        let payload = format!("{incoming}/{filename}");
        validate_guest_path(&incoming)?;
        validate_guest_path(&output_dir)?;
        validate_guest_path(&payload)?;
        Ok(Self { payload, output_dir })
    }
}

async fn run_guest_stages(
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
    req: &AnalysisRequest,
    endpoint: &SshEndpoint,
    remote: &GuestPaths,
) -> Result<()> {
    reporter.step(&format!(
        "waiting for guest SSH on {GUEST_HOST}:{}",
        endpoint.port
    ));
    if !probe::wait_for_reachable(runner, endpoint, req.ssh_timeout).await {
        return Err(StageError::Unreachable {
            timeout_secs: req.ssh_timeout.as_secs(),
        }
        .into());
    }
    reporter.success("guest SSH reachable");

    reporter.step("transferring payload to guest");
    transfer::copy_to_guest(runner, endpoint, &req.payload, &remote.payload).await?;
    reporter.success("payload transferred");

    reporter.step("launching analysis agent");
    match trigger::launch_agent(
        runner,
        endpoint,
        &remote.payload,
        &remote.output_dir,
        req.agent_timeout_secs,
    )
    .await
    {
        Ok(()) => reporter.success("agent launched"),
        // Launch status for a backgrounded job is unreliable; log and go on.
        Err(e) => reporter.warn(&format!("{e:#}")),
    }

    if !req.collect_delay.is_zero() {
        reporter.step(&format!(
            "waiting {}s for the agent before collecting",
            req.collect_delay.as_secs()
        ));
        tokio::time::sleep(req.collect_delay).await;
    }

    reporter.step("collecting reports from guest");
    match collect::download_reports(runner, endpoint, &remote.output_dir, &req.reports_dir).await {
        Ok(()) => reporter.success("reports collected"),
        // Zero reports is a valid, reportable outcome.
        Err(e) => reporter.warn(&format!("{e:#}")),
    }
    Ok(())
}
