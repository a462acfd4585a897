mod ai;
mod app;
mod config;
mod db;
mod domain;
mod infrastructure;
mod linkedin;
mod notion;
mod slack;
mod tasks;
mod web_content;

use anyhow::Result;
use clap::{Parser, Subcommand};
use infrastructure::{directories, logging, shutdown};

#[derive(Parser)]
#[command(name = "hiring-tracker")]
#[command(about = "Turns job links posted in a Slack channel into Notion rows", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the channel on a schedule until interrupted
    Run,
    /// Run a single pass and exit
    Once,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories, config.watermark.backend)?;
    logging::init_tracing(&config, &paths)?;

    let app = app::HiringTrackerApp::initialize(config, &paths).await?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => app.run_forever(shutdown::ShutdownSignal::install()).await,
        Commands::Once => {
            let report = app.run_once().await?;
            tracing::info!(%report, "single pass complete");
            Ok(())
        }
    }
}
