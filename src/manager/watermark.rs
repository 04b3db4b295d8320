// Watermark operations - Show, Reset, Set

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::WatermarkCommands;
use crate::config::Config;
use crate::core::traits::WatermarkStore;
use crate::storage::FileWatermarkStore;
use crate::utils::format::format_epoch;
use crate::utils::{OutputStyle, prompt_yes_no};

pub fn handle_watermark_command(config_path: &Path, command: WatermarkCommands) -> Result<()> {
    let store = FileWatermarkStore::new(Config::state_file_path(config_path));
    run_watermark_command(&store, command)
}

fn run_watermark_command(store: &dyn WatermarkStore, command: WatermarkCommands) -> Result<()> {
    match command {
        WatermarkCommands::Show => {
            let value = store.get().context("Failed to read watermark")?;
            OutputStyle::print_field_colored("Watermark", &value.to_string(), OutputStyle::info);
            let synced = if value == 0 {
                "never".to_string()
            } else {
                format_epoch(value)
            };
            OutputStyle::print_field_colored("Synced up to", &synced, OutputStyle::muted);
        }
        WatermarkCommands::Reset { yes } => {
            if yes || prompt_yes_no("Reset the watermark? The next sync will re-commit every accepted submission.")? {
                store.reset().context("Failed to reset watermark")?;
                println!("✓ Watermark reset");
            } else {
                println!("Reset cancelled.");
            }
        }
        WatermarkCommands::Set { seconds } => {
            store.set(seconds).context("Failed to write watermark")?;
            println!("✓ Watermark set to {} ({})", seconds, format_epoch(seconds));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_reset_through_commands() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWatermarkStore::new(dir.path().join("state.toml"));

        run_watermark_command(&store, WatermarkCommands::Set { seconds: 1704067200 }).unwrap();
        assert_eq!(store.get().unwrap(), 1704067200);

        run_watermark_command(&store, WatermarkCommands::Reset { yes: true }).unwrap();
        assert_eq!(store.get().unwrap(), 0);
    }

    #[test]
    fn test_show_on_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWatermarkStore::new(dir.path().join("state.toml"));
        run_watermark_command(&store, WatermarkCommands::Show).unwrap();
    }
}
