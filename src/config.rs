use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TOKEN_ENV_VAR: &str = "ATCODER_COMMITTER_GITHUB_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub atcoder: AtCoderConfig,
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtCoderConfig {
    #[serde(
        default,
        serialize_with = "crate::utils::format::serialize_option_string",
        deserialize_with = "crate::utils::format::deserialize_option_string"
    )]
    pub username: Option<String>,
    pub api_base_url: String,
    pub site_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Pause between consecutive submission pages.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(
        default,
        serialize_with = "crate::utils::format::serialize_option_string",
        deserialize_with = "crate::utils::format::deserialize_option_string"
    )]
    pub access_token: Option<String>,
    #[serde(
        default,
        serialize_with = "crate::utils::format::serialize_option_string",
        deserialize_with = "crate::utils::format::deserialize_option_string"
    )]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub output_dir: String,
    pub api_base_url: String,
    #[serde(default = "default_commit_delay_ms")]
    pub commit_delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_pages() -> usize {
    20
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_commit_delay_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            atcoder: AtCoderConfig {
                username: None,
                api_base_url: "https://kenkoooo.com/atcoder/atcoder-api/v3".to_string(),
                site_base_url: "https://atcoder.jp".to_string(),
                timeout_secs: default_timeout_secs(),
                max_pages: default_max_pages(),
                page_delay_ms: default_page_delay_ms(),
            },
            github: GitHubConfig {
                access_token: None,
                repo_url: None,
                output_dir: String::new(),
                api_base_url: "https://api.github.com".to_string(),
                commit_delay_ms: default_commit_delay_ms(),
            },
        }
    }
}

impl AtCoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl GitHubConfig {
    /// Token from the config file, then from the environment.
    pub fn resolve_token(&self) -> Option<String> {
        self.access_token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }
}

impl Config {
    /// Load `config_path`, writing the defaults there first if it does not exist.
    pub fn load_custom(config_path: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(config_path)?;
            return Ok(default_config);
        }

        let content = std::fs::read_to_string(config_path).map_err(|e| AppError::Io(e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| AppError::System(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.atcoder.api_base_url.trim().is_empty() {
            return Err(AppError::System("AtCoder API base URL cannot be empty".to_string()));
        }

        if self.atcoder.site_base_url.trim().is_empty() {
            return Err(AppError::System("AtCoder site base URL cannot be empty".to_string()));
        }

        if self.github.api_base_url.trim().is_empty() {
            return Err(AppError::System("GitHub API base URL cannot be empty".to_string()));
        }

        if self.atcoder.timeout_secs == 0 {
            return Err(AppError::System("Request timeout must be at least one second".to_string()));
        }

        if self.atcoder.max_pages == 0 {
            return Err(AppError::System("max_pages must be at least 1".to_string()));
        }

        Ok(())
    }

    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Io(e.to_string()))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::System(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content).map_err(|e| AppError::Io(e.to_string()))?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("atcoder-committer")
    }

    pub fn config_file_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Machine-written sync state lives next to the config file it belongs to.
    pub fn state_file_path(config_path: &Path) -> PathBuf {
        config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_dir)
            .join("state.toml")
    }
}
