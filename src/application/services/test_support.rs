//! Shared test helpers for service tests.
//!
//! Provides cross-platform `exit_status()`, output constructors, and a
//! scripted `CommandRunner` stub that records every invocation.

#![allow(clippy::expect_used)]

use std::cell::RefCell;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::CommandRunner;

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero =
/// failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we
/// shift. On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

/// Recording `CommandRunner` stub. Each invocation is rendered as
/// `"program arg1 arg2 …"` and appended to `calls`; invocations whose
/// rendered line contains `fail_matching` return exit code 1.
pub struct ScriptedRunner {
    pub calls: RefCell<Vec<String>>,
    fail_matching: Option<&'static str>,
}

impl ScriptedRunner {
    pub fn all_ok() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_matching: None,
        }
    }

    pub fn failing_on(pattern: &'static str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_matching: Some(pattern),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.contains(pattern))
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let line = format!("{program} {}", args.join(" "));
        self.calls.borrow_mut().push(line.clone());
        match self.fail_matching {
            Some(pat) if line.contains(pat) => Ok(err_output(1, b"scripted failure")),
            _ => Ok(ok_output(b"")),
        }
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<Output> {
        self.run(program, args).await
    }
}
