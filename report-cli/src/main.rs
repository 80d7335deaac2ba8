use anyhow::Context;
use clap::Parser;
use tracing::debug;

use report_cli::{AppConfig, Cli, app, logging};

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging();
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load settings")?;
    config.apply_env();
    config.apply_cli(cli.backend.clone(), cli.db.clone());
    debug!(?config, "settings resolved");

    app::run(cli, config).await
}
