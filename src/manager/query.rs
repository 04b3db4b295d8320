// Query operations - List, Repos
// Read-only views of both sides; only `repos --select` writes to the config.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;

use crate::cli::{ListArgs, ListFormat, ReposArgs};
use crate::config::Config;
use crate::core::data::{RepoCoords, Submission};
use crate::core::traits::{RepositoryClient, SubmissionFeed};
use crate::sync::{AtCoderClient, GitHubClient};
use crate::utils::error::{AppError, ConfigIssue, FlowResult, handle_flow};
use crate::utils::output::{render_detailed, render_repositories, render_simple};
use crate::utils::pagination::print_paged;
use crate::utils::{OutputStyle, select_from_list};

const SECONDS_PER_DAY: u64 = 86_400;

/// Earliest epoch second covered by a `--days` window.
fn window_start(now: i64, days: u32) -> u64 {
    let now = u64::try_from(now).unwrap_or(0);
    now.saturating_sub(u64::from(days) * SECONDS_PER_DAY)
}

/// Newest first, optionally accepted only.
fn prepare_listing(mut submissions: Vec<Submission>, accepted_only: bool) -> Vec<Submission> {
    if accepted_only {
        submissions.retain(Submission::is_accepted);
    }
    submissions.sort_by(|a, b| b.epoch_second.cmp(&a.epoch_second).then(b.id.cmp(&a.id)));
    submissions
}

pub async fn handle_list_command(config: &Config, args: &ListArgs) -> Result<()> {
    let username = config
        .atcoder
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(AppError::Config(ConfigIssue::MissingUsername))?;

    let client = AtCoderClient::new(&config.atcoder).context("Failed to set up AtCoder client")?;
    let from_second = window_start(Utc::now().timestamp(), args.days);
    tracing::debug!(user = username, from_second, "listing submissions");

    let submissions = client
        .fetch_submissions(username, from_second)
        .await
        .context("Failed to fetch submissions")?;
    let submissions = prepare_listing(submissions, args.accepted);

    if submissions.is_empty() {
        handle_flow(FlowResult::EmptyList {
            item_type: "submissions".to_string(),
        });
        return Ok(());
    }

    let output = match args.format.clone().unwrap_or(ListFormat::Simple) {
        ListFormat::Simple => render_simple(&submissions),
        ListFormat::Detailed => render_detailed(&submissions),
        ListFormat::Json => {
            let mut json = serde_json::to_string_pretty(&submissions).context("Failed to serialize submissions")?;
            json.push('\n');
            json
        }
    };

    print_paged(&output)?;
    Ok(())
}

pub async fn handle_repos_command(mut config: Config, config_path: &Path, args: &ReposArgs) -> Result<()> {
    let client = GitHubClient::new(&config.github).context("Failed to set up GitHub client")?;
    let repos = client
        .list_repositories()
        .await
        .context("Failed to list repositories")?;

    if repos.is_empty() {
        handle_flow(FlowResult::EmptyList {
            item_type: "repositories".to_string(),
        });
        return Ok(());
    }

    if !args.select {
        OutputStyle::print_header("📚 Repositories");
        print_paged(&render_repositories(&repos))?;
        return Ok(());
    }

    let items: Vec<String> = repos.iter().map(|r| r.full_name.clone()).collect();
    let Some(index) = select_from_list("Select the repository to commit into:", &items)? else {
        handle_flow(FlowResult::Cancelled("Selection cancelled".to_string()));
        return Ok(());
    };

    let chosen = &repos[index];
    if RepoCoords::parse(&chosen.html_url).is_none() {
        return Err(AppError::Config(ConfigIssue::InvalidRepoUrl(chosen.html_url.clone())).into());
    }

    config.github.repo_url = Some(chosen.html_url.clone());
    config.save_to(config_path).context("Failed to save configuration")?;
    handle_flow(FlowResult::Success(format!("Repository set to {}", chosen.html_url)));
    Ok(())
}
