//! atcoder-committer - mirrors accepted AtCoder submissions into a GitHub
//! repository, one commit per submission, dated at submission time.
//!
//! The library exposes the sync engine and its collaborators so they can be
//! driven without the CLI.

pub mod cli;
pub mod config;
pub mod core;
pub mod manager;
pub mod storage;
pub mod sync;
pub mod utils;

// Re-export core types and traits for easier use
pub use core::{
    data::{CommitAuthor, RepoCoords, Submission, SyncOutcome, SyncSummary},
    language::classify,
    traits::{RepositoryClient, SubmissionFeed, WatermarkStore},
};
pub use storage::FileWatermarkStore;
pub use sync::{AtCoderClient, CancelHandle, GitHubClient, SyncEngine, SyncPhase, SyncSettings};
pub use utils::error::{AppError, AppResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
