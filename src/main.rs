//! Binary entry point for the netrag CLI.

use std::io::Write;

use clap::Parser;
use netrag::cli::{Cli, execute};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "netrag=debug" } else { "netrag=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output = execute(&cli).await?;
    if !output.is_empty() {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "{output}");
    }
    Ok(())
}
