use clap::Parser;
use meetsched::{cli::Cli, shutdown, startup};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    startup::init_logging()?;

    info!("Starting meetsched");

    let _interrupt = shutdown::watch_for_interrupt();

    // Load configuration
    let config = startup::load_config()?;

    startup::run(config, cli).await
}
