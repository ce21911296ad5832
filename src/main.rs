use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use supplyguard::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so piped output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SUPPLYGUARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.run().await
}
