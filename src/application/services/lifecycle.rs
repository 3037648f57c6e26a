//! VM lifecycle controller: backend-dispatched start and revert, plus the
//! per-run state machine.
//!
//! The state machine is `Unstarted -> Running -> Reverted`, with `Failed`
//! absorbing the error paths. There is no transition back into `Running`
//! within one run; a fresh run constructs a fresh controller.

use anyhow::Result;

use crate::application::ports::CommandRunner;
use crate::application::services::failure_detail;
use crate::domain::error::StageError;
use crate::domain::vm::{Backend, SNAPSHOT_NAME, VmTarget};

/// VM state as tracked by the controller over one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Unstarted,
    Running,
    Reverted,
    Failed,
}

/// Drives one VM through start and revert for a single analysis run.
pub struct LifecycleController<'a, R: CommandRunner> {
    target: &'a VmTarget,
    runner: &'a R,
    state: RunState,
}

impl<'a, R: CommandRunner> LifecycleController<'a, R> {
    #[must_use]
    pub fn new(target: &'a VmTarget, runner: &'a R) -> Self {
        Self {
            target,
            runner,
            state: RunState::Unstarted,
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Start the VM. VirtualBox boots headless; KVM starts directly.
    ///
    /// # Errors
    ///
    /// Returns `StageError::Start` if the backend tool cannot be spawned or
    /// exits non-zero. The controller moves to `Failed`.
    pub async fn start(&mut self) -> Result<(), StageError> {
        let name = self.target.name();
        let result = match self.target.backend {
            Backend::VirtualBox => {
                self.runner
                    .run("VBoxManage", &["startvm", name, "--type", "headless"])
                    .await
            }
            Backend::Kvm => self.runner.run("virsh", &["start", name]).await,
        };
        match result {
            Ok(out) if out.status.success() => {
                tracing::info!("VM '{name}' started");
                self.state = RunState::Running;
                Ok(())
            }
            Ok(out) => {
                self.state = RunState::Failed;
                Err(StageError::Start {
                    details: failure_detail(&out),
                })
            }
            Err(e) => {
                self.state = RunState::Failed;
                Err(StageError::Start {
                    details: format!("{e:#}"),
                })
            }
        }
    }

    /// Force-stop the VM, then restore the baseline snapshot.
    ///
    /// If the stop sub-step fails the restore is skipped and the failure
    /// propagates; a VM that cannot be stopped cannot be restored either.
    ///
    /// # Errors
    ///
    /// Returns `StageError::Revert` on either sub-step failing. The
    /// controller moves to `Failed`.
    pub async fn revert(&mut self) -> Result<(), StageError> {
        let name = self.target.name();
        let (stop, restore): (Vec<&str>, Vec<&str>) = match self.target.backend {
            Backend::VirtualBox => (
                vec!["controlvm", name, "poweroff"],
                vec!["snapshot", name, "restore", SNAPSHOT_NAME],
            ),
            Backend::Kvm => (
                vec!["destroy", name],
                vec!["snapshot-revert", name, SNAPSHOT_NAME],
            ),
        };
        let program = match self.target.backend {
            Backend::VirtualBox => "VBoxManage",
            Backend::Kvm => "virsh",
        };

        self.run_revert_step(program, &stop, "stopping VM").await?;
        self.run_revert_step(program, &restore, "restoring snapshot")
            .await?;

        tracing::info!("VM '{name}' reverted to snapshot '{SNAPSHOT_NAME}'");
        self.state = RunState::Reverted;
        Ok(())
    }

    async fn run_revert_step(
        &mut self,
        program: &str,
        args: &[&str],
        what: &str,
    ) -> Result<(), StageError> {
        match self.runner.run(program, args).await {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => {
                self.state = RunState::Failed;
                Err(StageError::Revert {
                    details: format!("{what}: {}", failure_detail(&out)),
                })
            }
            Err(e) => {
                self.state = RunState::Failed;
                Err(StageError::Revert {
                    details: format!("{what}: {e:#}"),
                })
            }
        }
    }
}
