//! nrfconnect CLI - nRF Connect SDK task runner
//!
//! Entry point for the nrfconnect command-line application.

use anyhow::Result;
use clap::Parser;

use nrfconnect_tasks::cli::output::{display_error, OutputConfig};
use nrfconnect_tasks::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Apply output configuration globally
    let output_config = OutputConfig::new(cli.quiet, cli.verbose);
    output_config.apply_global();

    // RUST_LOG directives still apply on top of the -v level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(output_config.tracing_level().into())
                .from_env_lossy(),
        )
        .init();

    // Run the command and handle errors
    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
