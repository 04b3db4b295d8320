//! Seams between the sync engine and the outside world.
//!
//! The engine only talks to these traits, so it can be driven against the
//! real AtCoder/GitHub clients or against in-memory fakes.

use crate::core::data::{Identity, RepoCoords, RepositorySummary, Submission};
use crate::utils::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Source of submission records and their code.
#[async_trait]
pub trait SubmissionFeed: Send + Sync {
    /// All submissions of `user` with `epoch_second >= from_second`, in feed order.
    async fn fetch_submissions(&self, user: &str, from_second: u64) -> AppResult<Vec<Submission>>;

    /// Raw source text of one submission.
    async fn fetch_source_code(&self, contest_id: &str, submission_id: u64) -> AppResult<String>;
}

/// Persisted "last synchronized second".
pub trait WatermarkStore: Send + Sync {
    fn get(&self) -> AppResult<u64>;

    /// Must be durable by the time it returns.
    fn set(&self, value: u64) -> AppResult<()>;

    fn reset(&self) -> AppResult<()> {
        self.set(0)
    }
}

/// Commit as read back from the hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: String,
    pub tree_sha: String,
}

/// One blob placed into a new tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: "100644".to_string(),
            kind: "blob".to_string(),
            sha: sha.into(),
        }
    }
}

/// Author or committer line with an explicit date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommit {
    pub message: String,
    pub tree_sha: String,
    pub parents: Vec<String>,
    pub author: Signature,
    pub committer: Signature,
}

/// Low-level repository operations needed to build commits by hand.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    async fn authenticated_user(&self) -> AppResult<Identity>;

    async fn list_repositories(&self) -> AppResult<Vec<RepositorySummary>>;

    async fn repository_exists(&self, coords: &RepoCoords) -> AppResult<bool>;

    async fn default_branch(&self, coords: &RepoCoords) -> AppResult<String>;

    /// Commit sha the branch currently points at.
    async fn get_ref(&self, coords: &RepoCoords, branch: &str) -> AppResult<String>;

    async fn get_commit(&self, coords: &RepoCoords, sha: &str) -> AppResult<CommitInfo>;

    async fn create_blob(&self, coords: &RepoCoords, content: &str) -> AppResult<String>;

    async fn create_tree(&self, coords: &RepoCoords, base_tree: &str, entries: &[TreeEntry]) -> AppResult<String>;

    async fn create_commit(&self, coords: &RepoCoords, commit: &NewCommit) -> AppResult<String>;

    /// Move the branch to `sha`. With `force == false` a non-fast-forward
    /// update fails with `AppError::Conflict`.
    async fn update_ref(&self, coords: &RepoCoords, branch: &str, sha: &str, force: bool) -> AppResult<()>;
}
