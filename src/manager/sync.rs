// Sync operation - wires the clients, the watermark store and the engine

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::storage::FileWatermarkStore;
use crate::sync::{AtCoderClient, GitHubClient, SyncEngine, SyncSettings};
use crate::utils::OutputStyle;
use crate::utils::output::print_sync_outcome;

pub fn build_engine(config: &Config, config_path: &Path) -> Result<SyncEngine> {
    let feed = AtCoderClient::new(&config.atcoder).context("Failed to set up AtCoder client")?;
    let repo = GitHubClient::new(&config.github).context("Failed to set up GitHub client")?;
    let watermark = FileWatermarkStore::new(Config::state_file_path(config_path));

    Ok(SyncEngine::new(
        Box::new(feed),
        Box::new(repo),
        Box::new(watermark),
        SyncSettings::from_config(config),
    ))
}

pub async fn handle_sync_command(config: &Config, config_path: &Path) -> Result<()> {
    let engine = build_engine(config, config_path)?;

    println!("🔄 {}", OutputStyle::info("Syncing AtCoder submissions to GitHub..."));

    // Ctrl+C stops after the submission being committed.
    let cancel = engine.cancel_handle();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current submission");
            cancel.cancel();
        }
    });

    let result = engine.run().await;
    watcher.abort();

    let outcome = result.context("Sync failed")?;
    print_sync_outcome(&outcome);
    Ok(())
}
