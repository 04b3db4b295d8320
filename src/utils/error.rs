use crate::utils::output::OutputStyle;
use thiserror::Error;

/// The piece of configuration a sync could not proceed without.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    #[error("AtCoder username is not set")]
    MissingUsername,

    #[error("Repository URL is not set")]
    MissingRepoUrl,

    #[error("'{0}' is not a GitHub repository URL")]
    InvalidRepoUrl(String),
}

#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(ConfigIssue),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("A sync is already in progress")]
    InProgress,

    #[error("Sync cancelled")]
    Cancelled,

    #[error("System error: {0}")]
    System(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl AppError {
    /// Errors that only affect one submission; the rest of the batch carries on.
    pub fn is_skippable(&self) -> bool {
        matches!(self, AppError::Extraction(_) | AppError::Conflict(_))
    }
}

impl From<ConfigIssue> for AppError {
    fn from(issue: ConfigIssue) -> Self {
        AppError::Config(issue)
    }
}

/// Result type alias for consistent error handling across the application
pub type AppResult<T> = Result<T, AppError>;

pub enum FlowResult {
    EmptyList { item_type: String },
    Cancelled(String),
    Success(String),
}

pub fn report_error(err: &AppError) {
    tracing::debug!(error = ?err, "command failed");
    match err {
        AppError::Config(issue) => {
            let hint = match issue {
                ConfigIssue::MissingUsername => "atcoder-committer config set username <NAME>",
                ConfigIssue::MissingRepoUrl | ConfigIssue::InvalidRepoUrl(_) => {
                    "atcoder-committer repos --select"
                }
            };
            eprintln!("⚙️  {}", OutputStyle::warning(&issue.to_string()));
            eprintln!("   {} {}", OutputStyle::muted("Fix with:"), OutputStyle::command(hint));
        }
        AppError::Auth(msg) => {
            eprintln!("🔑 {}", OutputStyle::error(&format!("Authentication: {}", msg)));
            eprintln!(
                "   {} {}",
                OutputStyle::muted("Fix with:"),
                OutputStyle::command("atcoder-committer config set token <TOKEN>")
            );
        }
        AppError::Network(msg) => {
            eprintln!("🌐 {}", OutputStyle::error(&format!("Network: {}", msg)));
        }
        AppError::Conflict(msg) | AppError::Extraction(msg) => {
            eprintln!("⚠️  {}", OutputStyle::warning(msg));
        }
        AppError::InProgress | AppError::Cancelled => {
            eprintln!("⏹️  {}", OutputStyle::muted(&err.to_string()));
        }
        _ => {
            eprintln!("❌ {}", OutputStyle::error(&err.to_string()));
        }
    }
}

pub fn handle_flow(flow: FlowResult) {
    match flow {
        FlowResult::EmptyList { item_type } => {
            let msg = format!("No {} found", item_type);
            println!("{}", OutputStyle::muted(&msg));
        }
        FlowResult::Cancelled(msg) => {
            println!("⏹️  {}", OutputStyle::muted(&msg));
        }
        FlowResult::Success(msg) => {
            println!("✅ {}", OutputStyle::success(&msg));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skippable_errors() {
        assert!(AppError::Extraction("gone".to_string()).is_skippable());
        assert!(AppError::Conflict("moved".to_string()).is_skippable());
        assert!(!AppError::Network("down".to_string()).is_skippable());
        assert!(!AppError::Auth("bad token".to_string()).is_skippable());
        assert!(!AppError::Config(ConfigIssue::MissingUsername).is_skippable());
    }

    #[test]
    fn test_config_issue_message() {
        let err: AppError = ConfigIssue::InvalidRepoUrl("https://gitlab.com/a/b".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: 'https://gitlab.com/a/b' is not a GitHub repository URL"
        );
    }
}
