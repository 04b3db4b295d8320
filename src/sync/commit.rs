//! Single-file commits built through the Git Data API.
//!
//! Each step produces a named value so a failure can be attributed to the
//! exact point of the sequence:
//! tip ref → tip commit (base tree) → blob → tree → commit → ref update.

use crate::core::data::{CommitAuthor, RepoCoords};
use crate::core::traits::{NewCommit, RepositoryClient, Signature, TreeEntry};
use crate::utils::error::{AppError, AppResult};
use chrono::{DateTime, Utc};

/// One file to write at `path` on `branch`.
#[derive(Debug, Clone)]
pub struct FileCommit<'a> {
    pub branch: &'a str,
    pub path: &'a str,
    pub content: &'a str,
    pub message: &'a str,
    pub author: &'a CommitAuthor,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    pub commit_sha: String,
    pub tree_sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedBlob {
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedTree {
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedCommit {
    pub sha: String,
    pub parent: String,
}

/// Result of a commit that landed on the branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tip: BranchTip,
    pub blob: StagedBlob,
    pub tree: StagedTree,
    pub commit: StagedCommit,
}

pub async fn read_tip(client: &dyn RepositoryClient, coords: &RepoCoords, branch: &str) -> AppResult<BranchTip> {
    let commit_sha = client.get_ref(coords, branch).await.map_err(|e| match e {
        AppError::NotFound(_) => AppError::NotFound(format!("Branch {} does not exist in {}", branch, coords)),
        other => other,
    })?;
    let commit = client.get_commit(coords, &commit_sha).await?;
    Ok(BranchTip {
        commit_sha,
        tree_sha: commit.tree_sha,
    })
}

pub async fn stage_blob(client: &dyn RepositoryClient, coords: &RepoCoords, content: &str) -> AppResult<StagedBlob> {
    let sha = client.create_blob(coords, content).await?;
    Ok(StagedBlob { sha })
}

pub async fn stage_tree(
    client: &dyn RepositoryClient,
    coords: &RepoCoords,
    tip: &BranchTip,
    path: &str,
    blob: &StagedBlob,
) -> AppResult<StagedTree> {
    let entries = [TreeEntry::blob(path, blob.sha.clone())];
    let sha = client.create_tree(coords, &tip.tree_sha, &entries).await?;
    Ok(StagedTree { sha })
}

pub async fn stage_commit(
    client: &dyn RepositoryClient,
    coords: &RepoCoords,
    tip: &BranchTip,
    tree: &StagedTree,
    file: &FileCommit<'_>,
) -> AppResult<StagedCommit> {
    let signature = Signature {
        name: file.author.name.clone(),
        email: file.author.email.clone(),
        date: file.date,
    };
    let commit = NewCommit {
        message: file.message.to_string(),
        tree_sha: tree.sha.clone(),
        parents: vec![tip.commit_sha.clone()],
        author: signature.clone(),
        committer: signature,
    };
    let sha = client.create_commit(coords, &commit).await?;
    Ok(StagedCommit {
        sha,
        parent: tip.commit_sha.clone(),
    })
}

/// Fast-forward the branch onto `commit`. If the branch no longer points at
/// the commit's parent, someone else moved it and the update is refused.
pub async fn advance_branch(
    client: &dyn RepositoryClient,
    coords: &RepoCoords,
    branch: &str,
    commit: &StagedCommit,
) -> AppResult<()> {
    let current = client.get_ref(coords, branch).await?;
    if current != commit.parent {
        return Err(AppError::Conflict(format!(
            "Branch {} moved from {} to {} while committing",
            branch, commit.parent, current
        )));
    }
    client.update_ref(coords, branch, &commit.sha, false).await
}

/// Run the whole sequence for one file.
pub async fn commit_file(
    client: &dyn RepositoryClient,
    coords: &RepoCoords,
    file: &FileCommit<'_>,
) -> AppResult<CommitReceipt> {
    let tip = read_tip(client, coords, file.branch).await?;
    tracing::debug!(branch = file.branch, tip = %tip.commit_sha, "read branch tip");

    let blob = stage_blob(client, coords, file.content).await?;
    tracing::debug!(blob = %blob.sha, path = file.path, "created blob");

    let tree = stage_tree(client, coords, &tip, file.path, &blob).await?;
    tracing::debug!(tree = %tree.sha, base = %tip.tree_sha, "created tree");

    let commit = stage_commit(client, coords, &tip, &tree, file).await?;
    tracing::debug!(commit = %commit.sha, parent = %commit.parent, "created commit");

    advance_branch(client, coords, file.branch, &commit).await?;
    tracing::debug!(branch = file.branch, commit = %commit.sha, "advanced branch");

    Ok(CommitReceipt { tip, blob, tree, commit })
}
