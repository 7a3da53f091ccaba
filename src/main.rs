use anyhow::Result;
use clap::Parser;
use portfolio_report::cli::Cli;
use portfolio_report::dispatcher;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging on stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    dispatcher::dispatch(cli)
}
