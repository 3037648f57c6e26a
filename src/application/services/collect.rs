//! Report collector: pull `report-*.json` artifacts back from the guest.
//!
//! Best-effort by contract: a failed pull (no reports produced, network
//! error) is a reportable outcome, not an orchestration fault, so callers
//! log it and proceed to revert.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::application::ports::CommandRunner;
use crate::application::services::failure_detail;
use crate::domain::vm::SshEndpoint;

/// Naming pattern the guest agent uses for result artifacts.
pub const REPORT_GLOB: &str = "report-*.json";

/// Timeout for the scp pull; report sets can carry large process dumps.
const COLLECT_TIMEOUT: Duration = Duration::from_secs(300);

/// Pull all report artifacts from `remote_dir` into `local_dir`.
///
/// The local directory is created first (idempotent). The glob is expanded
/// by the guest side of the copy.
///
/// # Errors
///
/// Returns an error if the local directory cannot be created or the pull
/// exits non-zero. Non-fatal by contract.
pub async fn download_reports(
    runner: &impl CommandRunner,
    endpoint: &SshEndpoint,
    remote_dir: &str,
    local_dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(local_dir)
        .with_context(|| format!("creating reports directory {}", local_dir.display()))?;
    let local = local_dir
        .to_str()
        .context("reports directory path is not valid UTF-8")?;

    let port = endpoint.port.to_string();
    let src = format!("{}:{remote_dir}/{REPORT_GLOB}", endpoint.principal());
    let dest = format!("{local}/");

    let result = runner
        .run_with_timeout(
            "scp",
            &[
                "-P",
                &port,
                "-o",
                "StrictHostKeyChecking=no",
                &src,
                &dest,
            ],
            COLLECT_TIMEOUT,
        )
        .await;
    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => bail!("report pull failed: {}", failure_detail(&out)),
        Err(e) => bail!("report pull failed: {e:#}"),
    }
}

/// List the report artifacts present in `local_dir`, sorted by file name.
///
/// Best-effort: an unreadable directory yields an empty set.
#[must_use]
pub fn collected_reports(local_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(local_dir) else {
        return Vec::new();
    };
    let mut reports: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("report-") && n.ends_with(".json"))
        })
        .collect();
    reports.sort();
    reports
}
