use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::manager::{
    handle_config_command, handle_list_command, handle_repos_command, handle_sync_command, handle_watermark_command,
};

#[derive(Parser)]
#[command(name = "atcoder-committer")]
#[command(about = "Commit your accepted AtCoder submissions to a GitHub repository")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Commands {
    pub async fn execute(self, config: Config, config_path: &Path) -> Result<()> {
        match self {
            Commands::Sync => {
                handle_sync_command(&config, config_path).await?;
            }
            Commands::List(args) => {
                handle_list_command(&config, &args).await?;
            }
            Commands::Repos(args) => {
                handle_repos_command(config, config_path, &args).await?;
            }
            Commands::Watermark(args) => {
                handle_watermark_command(config_path, args.command)?;
            }
            Commands::Config(args) => {
                handle_config_command(config, config_path, args.command)?;
            }
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Commit new accepted submissions to the configured repository
    Sync,

    /// List recent submissions
    List(ListArgs),

    /// List repositories the token can access
    Repos(ReposArgs),

    /// Inspect or change the sync watermark
    Watermark(WatermarkArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 7, help = "How many days back to look")]
    pub days: u32,

    #[arg(short, long, help = "Only show accepted submissions")]
    pub accepted: bool,

    #[arg(short, long)]
    pub format: Option<ListFormat>,
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum ListFormat {
    Simple,
    Detailed,
    Json,
}

#[derive(Args)]
pub struct ReposArgs {
    #[arg(short, long, help = "Pick a repository and store it in the config")]
    pub select: bool,
}

#[derive(Args)]
pub struct WatermarkArgs {
    #[command(subcommand)]
    pub command: WatermarkCommands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum WatermarkCommands {
    /// Show the current watermark
    Show,

    /// Reset the watermark so the next sync starts from the beginning
    Reset {
        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    /// Set the watermark to an epoch second
    Set { seconds: u64 },
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset {
        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    /// Set a value
    Set { key: ConfigKey, value: String },

    /// Clear a value
    Unset { key: ConfigKey },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
    Username,
    RepoUrl,
    OutputDir,
    Token,
}

impl ConfigKey {
    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::Username => "username",
            ConfigKey::RepoUrl => "repo-url",
            ConfigKey::OutputDir => "output-dir",
            ConfigKey::Token => "token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_args() {
        let cli = Cli::try_parse_from(["atcoder-committer", "list", "--days", "30", "--accepted", "-f", "json"]).unwrap();
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.days, 30);
                assert!(args.accepted);
                assert_eq!(args.format, Some(ListFormat::Json));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_parse_config_set_key() {
        let cli = Cli::try_parse_from(["atcoder-committer", "config", "set", "repo-url", "https://github.com/a/b"])
            .unwrap();
        match cli.command {
            Commands::Config(ConfigArgs {
                command: Some(ConfigCommands::Set { key, value }),
            }) => {
                assert_eq!(key, ConfigKey::RepoUrl);
                assert_eq!(value, "https://github.com/a/b");
            }
            _ => panic!("expected config set"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["atcoder-committer", "sync", "-d", "-c", "/tmp/c.toml"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Commands::Sync));
    }

    #[test]
    fn test_watermark_set_requires_number() {
        assert!(Cli::try_parse_from(["atcoder-committer", "watermark", "set", "soon"]).is_err());
        let cli = Cli::try_parse_from(["atcoder-committer", "watermark", "set", "100"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Watermark(WatermarkArgs {
                command: WatermarkCommands::Set { seconds: 100 }
            })
        ));
    }

    #[test]
    fn test_config_key_names_match_cli_values() {
        use clap::ValueEnum;
        for key in ConfigKey::value_variants() {
            let value = key.to_possible_value().unwrap();
            assert_eq!(value.get_name(), key.name());
        }
    }
}
