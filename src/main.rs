// Binary entry point - import modules directly
mod cli;
mod config;
mod core;
mod manager;
mod storage;
mod sync;
mod utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;
use utils::error::{AppError, report_error};

fn init_tracing(debug: bool) {
    let default_level = if debug { "atcoder_committer=debug" } else { "atcoder_committer=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_file_path);

    // Created with defaults on first run
    let config = Config::load_custom(&config_path)?;

    // Execute command
    cli.command.execute(config, &config_path).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli).await {
        tracing::debug!("command failed: {:#}", err);
        match err.downcast_ref::<AppError>() {
            Some(app_err) => report_error(app_err),
            None => eprintln!("❌ {:#}", err),
        }
        std::process::exit(1);
    }
}
