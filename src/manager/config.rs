// Configuration operations

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::{ConfigCommands, ConfigKey};
use crate::config::{Config, TOKEN_ENV_VAR};
use crate::core::data::RepoCoords;
use crate::utils::error::{AppError, AppResult, ConfigIssue};
use crate::utils::{OutputStyle, prompt_yes_no};

pub fn handle_config_command(mut config: Config, config_path: &Path, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) => handle_show_command(&config, config_path),
        Some(ConfigCommands::Reset { yes }) => handle_reset_command(config_path, yes),
        Some(ConfigCommands::Set { key, value }) => {
            apply_setting(&mut config, key, Some(&value))?;
            config.save_to(config_path).context("Failed to save configuration")?;
            println!("✓ {} updated", key.name());
            Ok(())
        }
        Some(ConfigCommands::Unset { key }) => {
            apply_setting(&mut config, key, None)?;
            config.save_to(config_path).context("Failed to save configuration")?;
            println!("✓ {} cleared", key.name());
            Ok(())
        }
        None => handle_config_help(config_path),
    }
}

/// Set (or clear with `None`) one user-facing setting.
pub fn apply_setting(config: &mut Config, key: ConfigKey, value: Option<&str>) -> AppResult<()> {
    let value = value.map(str::trim).filter(|v| !v.is_empty());
    match key {
        ConfigKey::Username => config.atcoder.username = value.map(str::to_string),
        ConfigKey::RepoUrl => {
            if let Some(url) = value
                && RepoCoords::parse(url).is_none()
            {
                return Err(AppError::Config(ConfigIssue::InvalidRepoUrl(url.to_string())));
            }
            config.github.repo_url = value.map(str::to_string);
        }
        ConfigKey::OutputDir => {
            config.github.output_dir = value.unwrap_or_default().trim_matches('/').to_string();
        }
        ConfigKey::Token => config.github.access_token = value.map(str::to_string),
    }
    Ok(())
}

fn display_or_unset(value: Option<&str>) -> String {
    value.map(str::to_string).unwrap_or_else(|| "(not set)".to_string())
}

fn handle_show_command(config: &Config, config_path: &Path) -> Result<()> {
    OutputStyle::print_header("⚙️  atcoder-committer configuration");

    println!("{}", OutputStyle::header("AtCoder:"));
    println!("{}", OutputStyle::field_line("Username", &display_or_unset(config.atcoder.username.as_deref())));
    println!("{}", OutputStyle::field_line("API", &config.atcoder.api_base_url));
    println!("{}", OutputStyle::field_line("Site", &config.atcoder.site_base_url));
    println!("{}", OutputStyle::field_line("Timeout", &format!("{}s", config.atcoder.timeout_secs)));
    println!("{}", OutputStyle::field_line("Max pages", &config.atcoder.max_pages.to_string()));

    println!("{}", OutputStyle::header("GitHub:"));
    println!("{}", OutputStyle::field_line("Repository", &display_or_unset(config.github.repo_url.as_deref())));
    let output_dir = if config.github.output_dir.is_empty() {
        "(repository root)".to_string()
    } else {
        config.github.output_dir.clone()
    };
    println!("{}", OutputStyle::field_line("Output dir", &output_dir));
    let token = if config.github.access_token.is_some() {
        "✓ (config file)".to_string()
    } else if config.github.resolve_token().is_some() {
        format!("✓ (${})", TOKEN_ENV_VAR)
    } else {
        "(not set)".to_string()
    };
    println!("{}", OutputStyle::field_line("Access token", &token));
    println!("{}", OutputStyle::field_line("Commit delay", &format!("{}ms", config.github.commit_delay_ms)));

    println!();
    println!("{} {}", OutputStyle::muted("File:"), config_path.display());
    Ok(())
}

fn handle_config_help(config_path: &Path) -> Result<()> {
    println!("⚙️  Configuration Management");
    println!("==========================");
    println!("Available configuration commands:");
    println!("  atcoder-committer config show               - Show current configuration");
    println!("  atcoder-committer config set <KEY> <VALUE>  - Set username, repo-url, output-dir or token");
    println!("  atcoder-committer config unset <KEY>        - Clear a setting");
    println!("  atcoder-committer config reset              - Reset configuration to defaults");
    println!();
    println!("Configuration file location: {}", config_path.display());
    Ok(())
}

fn handle_reset_command(config_path: &Path, yes: bool) -> Result<()> {
    if yes
        || prompt_yes_no(
            "Are you sure you want to reset configuration to defaults? This will overwrite your current settings.",
        )?
    {
        Config::default().save_to(config_path).context("Failed to save configuration")?;
        println!("✓ Configuration reset to defaults!");
    } else {
        println!("Reset cancelled.");
    }
    Ok(())
}
