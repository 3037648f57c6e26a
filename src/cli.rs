//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::Parser;

use crate::commands;
use crate::output::OutputContext;

/// Detonate an untrusted binary in a disposable VM and collect behavior reports
#[derive(Parser)]
#[command(name = "safebox-host", version)]
pub struct Cli {
    /// Output the run summary in JSON format
    #[arg(long)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(flatten)]
    pub analyze: commands::analyze::AnalyzeArgs,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if any fatal workflow stage fails; `main` maps the
    /// error to its contract exit code.
    pub async fn run(self) -> Result<()> {
        let ctx = OutputContext::new(self.no_color, self.quiet);
        commands::analyze::run(&self.analyze, &ctx, self.json).await
    }
}
