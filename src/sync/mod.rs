pub mod atcoder;
pub mod commit;
pub mod engine;
pub mod github;

#[cfg(test)]
pub(crate) mod testing;

pub use atcoder::AtCoderClient;
pub use engine::{CancelHandle, SyncEngine, SyncPhase, SyncSettings};
pub use github::GitHubClient;
