//! In-memory collaborators for exercising the sync engine, plus a local
//! HTTP stub for the real clients.

use crate::core::data::{Identity, RepoCoords, RepositorySummary, Submission};
use crate::core::traits::{CommitInfo, NewCommit, RepositoryClient, SubmissionFeed, TreeEntry, WatermarkStore};
use crate::sync::engine::CancelHandle;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub fn submission(id: u64, epoch_second: i64, problem_id: &str, result: &str) -> Submission {
    Submission {
        id,
        epoch_second,
        problem_id: problem_id.to_string(),
        contest_id: problem_id.split('_').next().unwrap_or(problem_id).to_string(),
        user_id: "testuser".to_string(),
        language: "C++ (GCC 9.2.1)".to_string(),
        point: 100.0,
        length: 200,
        result: result.to_string(),
        execution_time: Some(3),
    }
}

#[derive(Default)]
struct FeedState {
    submissions: Vec<Submission>,
    feed_error: Option<AppError>,
    code_errors: HashMap<u64, AppError>,
    requested_from: Vec<u64>,
    code_requests: Vec<u64>,
    cancel_on_code: Option<CancelHandle>,
}

#[derive(Clone, Default)]
pub struct FakeFeed {
    state: Arc<Mutex<FeedState>>,
}

impl FakeFeed {
    pub fn new(submissions: Vec<Submission>) -> Self {
        let feed = Self::default();
        feed.state.lock().unwrap().submissions = submissions;
        feed
    }

    pub fn failing(error: AppError) -> Self {
        let feed = Self::default();
        feed.state.lock().unwrap().feed_error = Some(error);
        feed
    }

    pub fn with_code_error(self, id: u64, error: AppError) -> Self {
        self.state.lock().unwrap().code_errors.insert(id, error);
        self
    }

    pub fn cancel_on_code_fetch(&self, handle: CancelHandle) {
        self.state.lock().unwrap().cancel_on_code = Some(handle);
    }

    pub fn requested_from(&self) -> Vec<u64> {
        self.state.lock().unwrap().requested_from.clone()
    }

    pub fn code_requests(&self) -> Vec<u64> {
        self.state.lock().unwrap().code_requests.clone()
    }
}

#[async_trait]
impl SubmissionFeed for FakeFeed {
    async fn fetch_submissions(&self, _user: &str, from_second: u64) -> AppResult<Vec<Submission>> {
        // Suspend once, like a real request would.
        tokio::task::yield_now().await;

        let mut state = self.state.lock().unwrap();
        state.requested_from.push(from_second);
        if let Some(error) = state.feed_error.clone() {
            return Err(error);
        }
        Ok(state
            .submissions
            .iter()
            .filter(|s| s.epoch_second >= from_second as i64)
            .cloned()
            .collect())
    }

    async fn fetch_source_code(&self, _contest_id: &str, submission_id: u64) -> AppResult<String> {
        let mut state = self.state.lock().unwrap();
        state.code_requests.push(submission_id);
        if let Some(handle) = &state.cancel_on_code {
            handle.cancel();
        }
        match state.code_errors.get(&submission_id) {
            Some(error) => Err(error.clone()),
            None => Ok(format!("// code for {}", submission_id)),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredCommit {
    tree: String,
    parents: Vec<String>,
    created: Option<NewCommit>,
}

struct RepoState {
    next_id: usize,
    branch: String,
    head: String,
    commits: HashMap<String, StoredCommit>,
    trees: HashMap<String, BTreeMap<String, String>>,
    blobs: HashMap<String, String>,
    log: Vec<(String, NewCommit)>,
    identity: Result<Identity, AppError>,
    exists: bool,
    move_branch_after_commit: bool,
    ref_update_error: Option<AppError>,
}

impl RepoState {
    fn next_sha(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{:04}", prefix, self.next_id)
    }
}

#[derive(Clone)]
pub struct FakeRepo {
    state: Arc<Mutex<RepoState>>,
}

impl FakeRepo {
    /// Repository with one empty root commit on `main`.
    pub fn new() -> Self {
        let mut trees = HashMap::new();
        trees.insert("tree-root".to_string(), BTreeMap::new());
        let mut commits = HashMap::new();
        commits.insert(
            "commit-root".to_string(),
            StoredCommit {
                tree: "tree-root".to_string(),
                parents: Vec::new(),
                created: None,
            },
        );

        Self {
            state: Arc::new(Mutex::new(RepoState {
                next_id: 0,
                branch: "main".to_string(),
                head: "commit-root".to_string(),
                commits,
                trees,
                blobs: HashMap::new(),
                log: Vec::new(),
                identity: Ok(Identity {
                    login: "testuser".to_string(),
                    name: Some("Test User".to_string()),
                    email: None,
                }),
                exists: true,
                move_branch_after_commit: false,
                ref_update_error: None,
            })),
        }
    }

    pub fn with_identity_error(self, error: AppError) -> Self {
        self.state.lock().unwrap().identity = Err(error);
        self
    }

    pub fn without_repository(self) -> Self {
        self.state.lock().unwrap().exists = false;
        self
    }

    /// Every ref update fails with `error`.
    pub fn fail_ref_update_with(self, error: AppError) -> Self {
        self.state.lock().unwrap().ref_update_error = Some(error);
        self
    }

    /// Simulate someone else pushing right after our next commit object is created.
    pub fn move_branch_after_next_commit(&self) {
        self.state.lock().unwrap().move_branch_after_commit = true;
    }

    /// Commits that landed on the branch, oldest first.
    pub fn commit_log(&self) -> Vec<NewCommit> {
        self.state.lock().unwrap().log.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn commit_sha_at(&self, index: usize) -> String {
        self.state.lock().unwrap().log[index].0.clone()
    }

    pub fn head(&self) -> String {
        self.state.lock().unwrap().head.clone()
    }

    fn head_files(state: &RepoState) -> BTreeMap<String, String> {
        let tree = &state.commits[&state.head].tree;
        state.trees[tree].clone()
    }

    /// File content at the branch head.
    pub fn file(&self, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        let files = Self::head_files(&state);
        files.get(path).map(|sha| state.blobs[sha].clone())
    }

    pub fn file_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        Self::head_files(&state).len()
    }

    fn check_branch(state: &RepoState, branch: &str) -> AppResult<()> {
        if branch == state.branch {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("no branch {}", branch)))
        }
    }
}

#[async_trait]
impl RepositoryClient for FakeRepo {
    async fn authenticated_user(&self) -> AppResult<Identity> {
        self.state.lock().unwrap().identity.clone()
    }

    async fn list_repositories(&self) -> AppResult<Vec<RepositorySummary>> {
        Ok(vec![RepositorySummary {
            name: "repo".to_string(),
            full_name: "user/repo".to_string(),
            html_url: "https://github.com/user/repo".to_string(),
            description: None,
            private: false,
        }])
    }

    async fn repository_exists(&self, _coords: &RepoCoords) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().exists)
    }

    async fn default_branch(&self, _coords: &RepoCoords) -> AppResult<String> {
        Ok(self.state.lock().unwrap().branch.clone())
    }

    async fn get_ref(&self, _coords: &RepoCoords, branch: &str) -> AppResult<String> {
        let state = self.state.lock().unwrap();
        Self::check_branch(&state, branch)?;
        Ok(state.head.clone())
    }

    async fn get_commit(&self, _coords: &RepoCoords, sha: &str) -> AppResult<CommitInfo> {
        let state = self.state.lock().unwrap();
        let commit = state
            .commits
            .get(sha)
            .ok_or_else(|| AppError::NotFound(format!("no commit {}", sha)))?;
        Ok(CommitInfo {
            sha: sha.to_string(),
            tree_sha: commit.tree.clone(),
        })
    }

    async fn create_blob(&self, _coords: &RepoCoords, content: &str) -> AppResult<String> {
        let mut state = self.state.lock().unwrap();
        let sha = state.next_sha("blob");
        state.blobs.insert(sha.clone(), content.to_string());
        Ok(sha)
    }

    async fn create_tree(&self, _coords: &RepoCoords, base_tree: &str, entries: &[TreeEntry]) -> AppResult<String> {
        let mut state = self.state.lock().unwrap();
        let mut files = state
            .trees
            .get(base_tree)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("no tree {}", base_tree)))?;
        for entry in entries {
            files.insert(entry.path.clone(), entry.sha.clone());
        }
        let sha = state.next_sha("tree");
        state.trees.insert(sha.clone(), files);
        Ok(sha)
    }

    async fn create_commit(&self, _coords: &RepoCoords, commit: &NewCommit) -> AppResult<String> {
        let mut state = self.state.lock().unwrap();
        let sha = state.next_sha("commit");
        state.commits.insert(
            sha.clone(),
            StoredCommit {
                tree: commit.tree_sha.clone(),
                parents: commit.parents.clone(),
                created: Some(commit.clone()),
            },
        );

        if state.move_branch_after_commit {
            state.move_branch_after_commit = false;
            let external = state.next_sha("external");
            let tree = state.commits[&state.head].tree.clone();
            let parents = vec![state.head.clone()];
            state.commits.insert(
                external.clone(),
                StoredCommit {
                    tree,
                    parents,
                    created: None,
                },
            );
            state.head = external;
        }

        Ok(sha)
    }

    async fn update_ref(&self, _coords: &RepoCoords, branch: &str, sha: &str, force: bool) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_branch(&state, branch)?;
        if let Some(error) = state.ref_update_error.clone() {
            return Err(error);
        }
        let commit = state
            .commits
            .get(sha)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("no commit {}", sha)))?;
        if !force && !commit.parents.contains(&state.head) {
            return Err(AppError::Conflict(format!("{} is not a fast forward", sha)));
        }
        if let Some(created) = commit.created {
            state.log.push((sha.to_string(), created));
        }
        state.head = sha.to_string();
        Ok(())
    }
}

#[derive(Default)]
struct WatermarkState {
    value: u64,
    writes: usize,
}

#[derive(Clone, Default)]
pub struct MemoryWatermark {
    state: Arc<Mutex<WatermarkState>>,
}

impl MemoryWatermark {
    pub fn new(value: u64) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().value = value;
        store
    }

    pub fn value(&self) -> u64 {
        self.state.lock().unwrap().value
    }

    /// Number of `set` calls made through the trait.
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    /// Overwrite the value without counting it as a write.
    pub fn force(&self, value: u64) {
        self.state.lock().unwrap().value = value;
    }
}

impl WatermarkStore for MemoryWatermark {
    fn get(&self) -> AppResult<u64> {
        Ok(self.value())
    }

    fn set(&self, value: u64) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.value = value;
        state.writes += 1;
        Ok(())
    }
}

/// One canned HTTP answer of a [`StubServer`].
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Local HTTP server answering one connection per canned response, in order.
pub struct StubServer {
    pub base_url: String,
    request_lines: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start(responses: Vec<StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let request_lines = Arc::new(Mutex::new(Vec::new()));
        let log = request_lines.clone();

        tokio::spawn(async move {
            for response in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let request_line = read_request(&mut socket).await;
                log.lock().unwrap().push(request_line);

                let reply = format!(
                    "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    response.status,
                    response.body.len(),
                    response.body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { base_url, request_lines }
    }

    /// `METHOD /path?query HTTP/1.1` of every request served so far.
    pub fn request_lines(&self) -> Vec<String> {
        self.request_lines.lock().unwrap().clone()
    }
}

/// Read one request (head and body) and return its request line.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let body_len = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= head_end + 4 + body_len {
            return head.lines().next().unwrap_or_default().to_string();
        }
    }
    String::from_utf8_lossy(&buf).lines().next().unwrap_or_default().to_string()
}
