//! Data structures shared by the feed client, the repository client and the
//! sync engine.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Verdict string the judge reports for an accepted solution.
pub const ACCEPTED: &str = "AC";

/// One record of the public submission feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    pub epoch_second: i64,
    pub problem_id: String,
    pub contest_id: String,
    pub user_id: String,
    pub language: String,
    pub point: f64,
    pub length: u64,
    pub result: String,
    #[serde(default)]
    pub execution_time: Option<u64>,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.result == ACCEPTED
    }

    /// Submission time as an absolute timestamp, falling back to the epoch
    /// for values chrono cannot represent.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.epoch_second, 0).unwrap_or_default()
    }

    pub fn commit_message(&self) -> String {
        format!("[{}] {}", self.contest_id, self.problem_id)
    }
}

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoords {
    pub owner: String,
    pub repo: String,
}

static GITHUB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://(?:www\.)?github\.com/|git@github\.com:|ssh://git@github\.com/)([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?(?:/.*)?$",
    )
    .expect("repository URL pattern is valid")
});

impl RepoCoords {
    /// Resolve an HTTPS or SSH GitHub URL into coordinates.
    pub fn parse(url: &str) -> Option<Self> {
        let caps = GITHUB_URL.captures(url.trim())?;
        let owner = caps.get(1)?.as_str();
        let repo = caps.get(2)?.as_str();
        if repo.is_empty() || owner.chars().all(|c| c == '.') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl std::fmt::Display for RepoCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Account the hosting service reports for the current credential.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

impl CommitAuthor {
    pub fn bot() -> Self {
        Self {
            name: "AtCoder Committer".to_string(),
            email: "atcoder-committer@users.noreply.github.com".to_string(),
        }
    }

    pub fn from_identity(identity: Option<&Identity>) -> Self {
        let Some(identity) = identity.filter(|i| !i.login.is_empty()) else {
            return Self::bot();
        };

        let name = identity
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&identity.login)
            .to_string();
        let email = identity
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}@users.noreply.github.com", identity.login));

        Self { name, email }
    }
}

/// Repository path a submission is committed to:
/// `[output_dir/]contest/problem/problem.ext`.
pub fn destination_path(contest_id: &str, problem_id: &str, extension: &str, output_dir: &str) -> String {
    let base = format!("{contest_id}/{problem_id}/{problem_id}{extension}");
    let prefix = output_dir.trim_matches('/');
    if prefix.is_empty() {
        base
    } else {
        format!("{prefix}/{base}")
    }
}

/// Repository summary as listed for the authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub private: bool,
}

/// A submission the engine gave up on without failing the batch.
#[derive(Debug, Clone)]
pub struct SkippedSubmission {
    pub id: u64,
    pub contest_id: String,
    pub problem_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub fetched: usize,
    pub accepted: usize,
    pub committed: usize,
    pub skipped: usize,
    pub skipped_details: Vec<SkippedSubmission>,
    pub watermark: u64,
}

#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// The feed returned nothing at or after the watermark.
    NothingNew,
    /// Records were fetched but none of them was accepted.
    NoAccepted(SyncSummary),
    Committed(SyncSummary),
}

impl SyncOutcome {
    pub fn summary(&self) -> Option<&SyncSummary> {
        match self {
            SyncOutcome::NothingNew => None,
            SyncOutcome::NoAccepted(summary) | SyncOutcome::Committed(summary) => Some(summary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_path() {
        assert_eq!(
            destination_path("abc300", "abc300_a", ".cpp", "out"),
            "out/abc300/abc300_a/abc300_a.cpp"
        );
        assert_eq!(
            destination_path("abc300", "abc300_a", ".cpp", ""),
            "abc300/abc300_a/abc300_a.cpp"
        );
        assert_eq!(
            destination_path("abc300", "abc300_a", ".py", "/solutions/atcoder/"),
            "solutions/atcoder/abc300/abc300_a/abc300_a.py"
        );
        assert_eq!(destination_path("arc1", "arc1_b", ".rs", "/"), "arc1/arc1_b/arc1_b.rs");
    }

    #[test]
    fn test_parse_repo_url() {
        let expected = Some(RepoCoords {
            owner: "user".to_string(),
            repo: "repo".to_string(),
        });
        assert_eq!(RepoCoords::parse("https://github.com/user/repo.git"), expected);
        assert_eq!(RepoCoords::parse("git@github.com:user/repo.git"), expected);
        assert_eq!(RepoCoords::parse("https://github.com/user/repo"), expected);
        assert_eq!(RepoCoords::parse("git@github.com:user/repo"), expected);
        assert_eq!(RepoCoords::parse("https://github.com/user/repo/tree/main"), expected);
        assert_eq!(RepoCoords::parse("  https://github.com/user/repo/  "), expected);
    }

    #[test]
    fn test_parse_repo_url_keeps_complex_names() {
        let coords = RepoCoords::parse("https://github.com/my-org/my.awesome_repo.git").unwrap();
        assert_eq!(coords.owner, "my-org");
        assert_eq!(coords.repo, "my.awesome_repo");
        assert_eq!(coords.to_string(), "my-org/my.awesome_repo");
    }

    #[test]
    fn test_parse_repo_url_rejects_other_hosts() {
        assert_eq!(RepoCoords::parse("https://gitlab.com/user/repo"), None);
        assert_eq!(RepoCoords::parse("not-a-url"), None);
        assert_eq!(RepoCoords::parse(""), None);
        assert_eq!(RepoCoords::parse("https://github.com/user"), None);
    }

    #[test]
    fn test_commit_author_from_identity() {
        let identity = Identity {
            login: "tourist".to_string(),
            name: None,
            email: None,
        };
        let author = CommitAuthor::from_identity(Some(&identity));
        assert_eq!(author.name, "tourist");
        assert_eq!(author.email, "tourist@users.noreply.github.com");

        let identity = Identity {
            login: "tourist".to_string(),
            name: Some("Gennady".to_string()),
            email: Some("g@example.com".to_string()),
        };
        let author = CommitAuthor::from_identity(Some(&identity));
        assert_eq!(author.name, "Gennady");
        assert_eq!(author.email, "g@example.com");

        assert_eq!(CommitAuthor::from_identity(None), CommitAuthor::bot());
    }

    #[test]
    fn test_submission_deserialize_and_helpers() {
        let json = r#"{
            "id": 12345678,
            "epoch_second": 1704067200,
            "problem_id": "abc300_a",
            "contest_id": "abc300",
            "user_id": "testuser",
            "language": "C++ (GCC 9.2.1)",
            "point": 100.0,
            "length": 500,
            "result": "AC",
            "execution_time": null
        }"#;
        let submission: Submission = serde_json::from_str(json).unwrap();
        assert!(submission.is_accepted());
        assert_eq!(submission.execution_time, None);
        assert_eq!(submission.commit_message(), "[abc300] abc300_a");
        assert_eq!(submission.submitted_at().to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }
}
