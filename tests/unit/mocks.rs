//! Shared mock infrastructure for unit tests.
//!
//! Provides a recording [`CommandRunner`] with scriptable responses and
//! output helpers so each test file doesn't have to re-define the same
//! boilerplate.

#![allow(clippy::expect_used, dead_code)]

use std::cell::RefCell;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;
use safebox_host::application::ports::{CommandRunner, ProgressReporter};

// ── Output helpers ────────────────────────────────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero =
/// failure). On Unix the raw wait-status encodes the exit code in bits 8–15.
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

// ── Recording runner ──────────────────────────────────────────────────────────

/// Recording `CommandRunner`. Every invocation is rendered as
/// `"program arg1 arg2 …"`, appended to `calls`, and answered by the
/// scripted responder.
pub struct RecordingRunner {
    pub calls: RefCell<Vec<String>>,
    responder: Box<dyn Fn(&str) -> Output>,
}

impl RecordingRunner {
    pub fn scripted(responder: impl Fn(&str) -> Output + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    pub fn all_ok() -> Self {
        Self::scripted(|_| ok_output(b""))
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

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let line = format!("{program} {}", args.join(" "));
        self.calls.borrow_mut().push(line.clone());
        Ok((self.responder)(&line))
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

// ── Reporter stub ─────────────────────────────────────────────────────────────

/// Reporter that swallows all progress events.
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}
