//! SafeBox host orchestrator - detonate untrusted binaries in a disposable VM

use clap::Parser;

use safebox_host::cli::Cli;
use safebox_host::domain::error::exit_code_for;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code_for(&e));
    }
}
