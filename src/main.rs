use anyhow::Result;
use clap::Parser;
use letterterm::cli::{run_cli, Cli};
use letterterm::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = cli.storage()?;

    let log_file = cli.log_file.clone().unwrap_or_else(|| storage.dir().join("letterterm.log"));
    logging::init_tracing(&log_file)?;

    run_cli(cli, storage).await
}
