//! The analysis command — builds the request, runs the driver, renders the
//! summary.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use crate::application::services::analysis::{self, AnalysisOutcome, AnalysisRequest};
use crate::infra::command_runner::TokioCommandRunner;
use crate::output::{OutputContext, TerminalReporter};

/// Arguments for one analysis run.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Hypervisor backend: virtualbox or kvm
    #[arg(long)]
    pub backend: String,

    /// Name of the analysis VM (must carry a 'clean' snapshot)
    #[arg(long)]
    pub vm_name: String,

    /// Local file to detonate inside the guest
    #[arg(long)]
    pub file: PathBuf,

    /// Guest user the payload and agent run under
    #[arg(long, default_value = "safebox", env = "SAFEBOX_GUEST_USER")]
    pub user: String,

    /// Forwarded SSH port of the guest
    #[arg(long, default_value_t = 2222, env = "SAFEBOX_SSH_PORT")]
    pub ssh_port: u16,

    /// Seconds to wait for guest SSH to become reachable
    #[arg(long, default_value_t = 120)]
    pub ssh_timeout: u64,

    /// Seconds the guest agent lets the sample run before killing it
    #[arg(long, default_value_t = 120)]
    pub agent_timeout: u32,

    /// Seconds to wait after launching the agent before collecting reports.
    /// The launch is fire-and-forget; 0 collects immediately and will
    /// usually see only reports from a previous pass of the agent.
    #[arg(long, default_value_t = 0)]
    pub collect_delay: u64,

    /// Guest directory receiving the payload [default: /home/<user>/incoming]
    #[arg(long)]
    pub guest_incoming: Option<String>,

    /// Guest directory the agent writes reports into [default: /home/<user>/out]
    #[arg(long)]
    pub guest_output: Option<String>,

    /// Local directory reports are pulled into
    #[arg(long, default_value = "./reports")]
    pub reports_dir: PathBuf,
}

impl AnalyzeArgs {
    fn to_request(&self) -> AnalysisRequest {
        AnalysisRequest {
            backend: self.backend.clone(),
            vm_name: self.vm_name.clone(),
            payload: self.file.clone(),
            guest_user: self.user.clone(),
            ssh_port: self.ssh_port,
            ssh_timeout: Duration::from_secs(self.ssh_timeout),
            agent_timeout_secs: self.agent_timeout,
            collect_delay: Duration::from_secs(self.collect_delay),
            guest_incoming: self.guest_incoming.clone(),
            guest_output: self.guest_output.clone(),
            reports_dir: self.reports_dir.clone(),
        }
    }
}

/// Machine-readable run summary for `--json`.
#[derive(Serialize)]
struct RunSummary {
    backend: String,
    vm_name: String,
    reports_dir: String,
    reports: Vec<String>,
    report_count: usize,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl From<&AnalysisOutcome> for RunSummary {
    fn from(outcome: &AnalysisOutcome) -> Self {
        Self {
            backend: outcome.backend.to_string(),
            vm_name: outcome.vm_name.clone(),
            reports_dir: outcome.reports_dir.display().to_string(),
            reports: outcome
                .reports
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            report_count: outcome.reports.len(),
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
        }
    }
}

/// Run the analysis workflow end to end.
///
/// # Errors
///
/// Propagates driver errors; `main` maps them to the exit-code contract.
pub async fn run(args: &AnalyzeArgs, ctx: &OutputContext, json: bool) -> Result<()> {
    let runner = TokioCommandRunner::default();
    let reporter = TerminalReporter::new(ctx);
    let outcome = analysis::run(&runner, &reporter, &args.to_request()).await?;
    drop(reporter);

    if json {
        println!("{}", serde_json::to_string_pretty(&RunSummary::from(&outcome))?);
        return Ok(());
    }

    ctx.success(&format!(
        "Analysis finished. {} report(s) in {}",
        outcome.reports.len(),
        outcome.reports_dir.display()
    ));
    for report in &outcome.reports {
        ctx.kv("Report", &report.display().to_string());
    }
    if outcome.reports.is_empty() {
        ctx.warn("No reports were produced; the guest agent may still be running.");
    }
    Ok(())
}
