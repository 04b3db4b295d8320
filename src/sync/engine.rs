use crate::config::Config;
use crate::core::data::{
    CommitAuthor, RepoCoords, SkippedSubmission, Submission, SyncOutcome, SyncSummary, destination_path,
};
use crate::core::language::classify;
use crate::core::traits::{RepositoryClient, SubmissionFeed, WatermarkStore};
use crate::sync::commit::{CommitReceipt, FileCommit, commit_file};
use crate::utils::error::{AppError, AppResult, ConfigIssue};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Where a sync invocation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Validating,
    Fetching,
    Filtering,
    Committing,
    Advancing,
    Done,
    Failed,
}

/// User-supplied inputs of a sync.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub username: Option<String>,
    pub repo_url: Option<String>,
    pub output_dir: String,
    pub commit_delay: Duration,
}

impl SyncSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            username: config.atcoder.username.clone(),
            repo_url: config.github.repo_url.clone(),
            output_dir: config.github.output_dir.clone(),
            commit_delay: config.github.commit_delay(),
        }
    }
}

/// Repository, branch and author resolved during validation.
#[derive(Debug, Clone)]
struct Target {
    coords: RepoCoords,
    branch: String,
    author: CommitAuthor,
}

/// Cooperative cancellation, checked between submissions.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Holds the in-flight flag for the duration of one run.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> AppResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AppError::InProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Pulls new submissions from the feed and commits the accepted ones,
/// one commit per submission, dated at submission time.
pub struct SyncEngine {
    feed: Box<dyn SubmissionFeed>,
    repo: Box<dyn RepositoryClient>,
    watermark: Box<dyn WatermarkStore>,
    settings: SyncSettings,
    phase: Mutex<SyncPhase>,
    in_flight: AtomicBool,
    cancel: CancelHandle,
}

impl SyncEngine {
    pub fn new(
        feed: Box<dyn SubmissionFeed>,
        repo: Box<dyn RepositoryClient>,
        watermark: Box<dyn WatermarkStore>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            feed,
            repo,
            watermark,
            settings,
            phase: Mutex::new(SyncPhase::Idle),
            in_flight: AtomicBool::new(false),
            cancel: CancelHandle::default(),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase.lock().map(|p| *p).unwrap_or(SyncPhase::Failed)
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    fn enter(&self, phase: SyncPhase) {
        if let Ok(mut current) = self.phase.lock() {
            tracing::debug!(from = ?*current, to = ?phase, "sync phase");
            *current = phase;
        }
    }

    /// Run one sync. A second call while one is running fails with
    /// `AppError::InProgress`.
    pub async fn run(&self) -> AppResult<SyncOutcome> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        self.cancel.clear();

        let result = self.run_phases().await;
        match &result {
            Ok(_) => self.enter(SyncPhase::Done),
            Err(e) => {
                tracing::warn!(error = %e, "sync failed");
                self.enter(SyncPhase::Failed);
            }
        }
        result
    }

    async fn run_phases(&self) -> AppResult<SyncOutcome> {
        self.enter(SyncPhase::Validating);
        let (username, target) = self.validate().await?;

        self.enter(SyncPhase::Fetching);
        let from_second = self.watermark.get()?;
        let fetched = self.feed.fetch_submissions(&username, from_second).await?;
        let Some(newest) = fetched.iter().map(|s| s.epoch_second).max() else {
            tracing::info!(from_second, "no new submissions");
            return Ok(SyncOutcome::NothingNew);
        };
        let next_watermark = u64::try_from(newest)
            .unwrap_or(0)
            .saturating_add(1)
            .max(from_second);

        self.enter(SyncPhase::Filtering);
        let accepted: Vec<&Submission> = fetched.iter().filter(|s| s.is_accepted()).collect();
        let mut summary = SyncSummary {
            fetched: fetched.len(),
            accepted: accepted.len(),
            ..SyncSummary::default()
        };
        tracing::info!(fetched = summary.fetched, accepted = summary.accepted, "filtered submissions");

        if !accepted.is_empty() {
            self.enter(SyncPhase::Committing);
            self.commit_all(&target, &accepted, &mut summary).await?;
        }

        self.enter(SyncPhase::Advancing);
        self.watermark.set(next_watermark)?;
        summary.watermark = next_watermark;

        if summary.accepted == 0 {
            Ok(SyncOutcome::NoAccepted(summary))
        } else {
            Ok(SyncOutcome::Committed(summary))
        }
    }

    async fn validate(&self) -> AppResult<(String, Target)> {
        let username = self
            .settings
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConfigIssue::MissingUsername)?
            .to_string();

        let repo_url = self
            .settings
            .repo_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConfigIssue::MissingRepoUrl)?;
        let coords =
            RepoCoords::parse(repo_url).ok_or_else(|| ConfigIssue::InvalidRepoUrl(repo_url.to_string()))?;

        let identity = match self.repo.authenticated_user().await {
            Ok(identity) => Some(identity),
            Err(AppError::Auth(msg)) => return Err(AppError::Auth(msg)),
            Err(e) => {
                tracing::warn!(error = %e, "could not resolve commit author, using bot identity");
                None
            }
        };
        let author = CommitAuthor::from_identity(identity.as_ref());

        if !self.repo.repository_exists(&coords).await? {
            return Err(AppError::NotFound(format!(
                "Repository {} does not exist or access is denied",
                coords
            )));
        }
        let branch = self.repo.default_branch(&coords).await?;
        tracing::debug!(repo = %coords, %branch, author = %author.name, "sync target resolved");

        Ok((username, Target { coords, branch, author }))
    }

    async fn commit_all(&self, target: &Target, accepted: &[&Submission], summary: &mut SyncSummary) -> AppResult<()> {
        for submission in accepted {
            if self.cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            match self.commit_submission(target, submission).await {
                Ok(receipt) => {
                    summary.committed += 1;
                    tracing::info!(
                        id = submission.id,
                        problem = %submission.problem_id,
                        commit = %receipt.commit.sha,
                        "committed submission"
                    );
                    if !self.settings.commit_delay.is_zero() {
                        tokio::time::sleep(self.settings.commit_delay).await;
                    }
                }
                Err(e) if e.is_skippable() => {
                    tracing::warn!(id = submission.id, problem = %submission.problem_id, error = %e, "skipping submission");
                    summary.skipped += 1;
                    summary.skipped_details.push(SkippedSubmission {
                        id: submission.id,
                        contest_id: submission.contest_id.clone(),
                        problem_id: submission.problem_id.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn commit_submission(&self, target: &Target, submission: &Submission) -> AppResult<CommitReceipt> {
        let code = self
            .feed
            .fetch_source_code(&submission.contest_id, submission.id)
            .await?;

        let path = destination_path(
            &submission.contest_id,
            &submission.problem_id,
            classify(&submission.language),
            &self.settings.output_dir,
        );
        let message = submission.commit_message();

        let file = FileCommit {
            branch: &target.branch,
            path: &path,
            content: &code,
            message: &message,
            author: &target.author,
            date: submission.submitted_at(),
        };
        commit_file(self.repo.as_ref(), &target.coords, &file).await
    }
}
