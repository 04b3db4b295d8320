use crate::config::{GitHubConfig, TOKEN_ENV_VAR};
use crate::core::data::{Identity, RepoCoords, RepositorySummary};
use crate::core::traits::{CommitInfo, NewCommit, RepositoryClient, Signature, TreeEntry};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = concat!("atcoder-committer/", env!("CARGO_PKG_VERSION"));
const REPOS_PER_PAGE: usize = 100;
const MAX_REPO_PAGES: usize = 3;

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitCommit {
    sha: String,
    tree: GitObject,
}

#[derive(Debug, Deserialize)]
struct Repository {
    default_branch: String,
}

#[derive(Debug, Serialize)]
struct CreateBlobRequest {
    content: String,
    encoding: &'static str,
}

#[derive(Debug, Serialize)]
struct CreateTreeRequest<'a> {
    base_tree: &'a str,
    tree: &'a [TreeEntry],
}

#[derive(Debug, Serialize)]
struct CreateCommitRequest<'a> {
    message: &'a str,
    tree: &'a str,
    parents: &'a [String],
    author: &'a Signature,
    committer: &'a Signature,
}

#[derive(Debug, Serialize)]
struct UpdateRefRequest<'a> {
    sha: &'a str,
    force: bool,
}

pub struct GitHubClient {
    client: Client,
    api_base_url: String,
    access_token: Option<String>,
}

impl GitHubClient {
    /// A client without a token can be built; every call then fails with
    /// `AppError::Auth` so the caller can ask for one.
    pub fn new(config: &GitHubConfig) -> AppResult<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: config.resolve_token(),
        })
    }

    fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let token = self.access_token.as_deref().ok_or_else(|| {
            AppError::Auth(format!(
                "GitHub access token not found. Set it in config or use the {} environment variable",
                TOKEN_ENV_VAR
            ))
        })?;

        Ok(self
            .client
            .request(method, format!("{}{}", self.api_base_url, path))
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28"))
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> AppResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Network(format!("{}: {}", context, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(status_error(status, &error_text, context))
    }

    async fn json<T: DeserializeOwned>(response: Response, context: &str) -> AppResult<T> {
        response
            .json()
            .await
            .map_err(|e| AppError::Protocol(format!("{}: unexpected response: {}", context, e)))
    }

    fn repo_path(coords: &RepoCoords, rest: &str) -> String {
        format!("/repos/{}/{}{}", coords.owner, coords.repo, rest)
    }
}

fn status_error(status: StatusCode, body: &str, context: &str) -> AppError {
    let detail = format!("{}: {} - {}", context, status, body);
    match status {
        StatusCode::UNAUTHORIZED => AppError::Auth(detail),
        StatusCode::FORBIDDEN if body.to_lowercase().contains("rate limit") => AppError::Network(detail),
        StatusCode::FORBIDDEN => AppError::Auth(detail),
        StatusCode::NOT_FOUND => AppError::NotFound(detail),
        StatusCode::TOO_MANY_REQUESTS => AppError::Network(detail),
        s if s.is_server_error() => AppError::Network(detail),
        _ => AppError::Protocol(detail),
    }
}

/// A non-forced ref update is only a race when the service says the branch
/// moved: 409, or 422 "not a fast forward". Anything else goes through
/// [`status_error`].
fn ref_update_error(status: StatusCode, body: &str, context: &str, force: bool) -> AppError {
    let not_fast_forward = status == StatusCode::CONFLICT
        || (status == StatusCode::UNPROCESSABLE_ENTITY && body.to_lowercase().contains("not a fast forward"));
    if not_fast_forward && !force {
        AppError::Conflict(format!("{}: {} - {}", context, status, body))
    } else {
        status_error(status, body, context)
    }
}

#[async_trait]
impl RepositoryClient for GitHubClient {
    async fn authenticated_user(&self) -> AppResult<Identity> {
        let context = "Failed to get authenticated user";
        let response = self.send(self.request(Method::GET, "/user")?, context).await?;
        Self::json(response, context).await
    }

    async fn list_repositories(&self) -> AppResult<Vec<RepositorySummary>> {
        let context = "Failed to list repositories";
        let mut repos = Vec::new();

        for page in 1..=MAX_REPO_PAGES {
            let request = self.request(Method::GET, "/user/repos")?.query(&[
                ("visibility", "all".to_string()),
                ("affiliation", "owner,collaborator,organization_member".to_string()),
                ("sort", "updated".to_string()),
                ("per_page", REPOS_PER_PAGE.to_string()),
                ("page", page.to_string()),
            ]);
            let response = self.send(request, context).await?;
            let batch: Vec<RepositorySummary> = Self::json(response, context).await?;
            let last_page = batch.len() < REPOS_PER_PAGE;
            repos.extend(batch);
            if last_page {
                break;
            }
        }

        Ok(repos)
    }

    async fn repository_exists(&self, coords: &RepoCoords) -> AppResult<bool> {
        let request = self.request(Method::GET, &Self::repo_path(coords, ""))?;
        match self.send(request, "Failed to check repository").await {
            Ok(_) => Ok(true),
            Err(AppError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn default_branch(&self, coords: &RepoCoords) -> AppResult<String> {
        let context = "Failed to get repository";
        let request = self.request(Method::GET, &Self::repo_path(coords, ""))?;
        let response = self.send(request, context).await?;
        let repo: Repository = Self::json(response, context).await?;
        Ok(repo.default_branch)
    }

    async fn get_ref(&self, coords: &RepoCoords, branch: &str) -> AppResult<String> {
        let context = format!("Failed to read branch {}", branch);
        let request = self.request(Method::GET, &Self::repo_path(coords, &format!("/git/ref/heads/{}", branch)))?;
        let response = self.send(request, &context).await?;
        let git_ref: GitRef = Self::json(response, &context).await?;
        Ok(git_ref.object.sha)
    }

    async fn get_commit(&self, coords: &RepoCoords, sha: &str) -> AppResult<CommitInfo> {
        let context = format!("Failed to read commit {}", sha);
        let request = self.request(Method::GET, &Self::repo_path(coords, &format!("/git/commits/{}", sha)))?;
        let response = self.send(request, &context).await?;
        let commit: GitCommit = Self::json(response, &context).await?;
        Ok(CommitInfo {
            sha: commit.sha,
            tree_sha: commit.tree.sha,
        })
    }

    async fn create_blob(&self, coords: &RepoCoords, content: &str) -> AppResult<String> {
        let context = "Failed to create blob";
        let body = CreateBlobRequest {
            content: STANDARD.encode(content.as_bytes()),
            encoding: "base64",
        };
        let request = self.request(Method::POST, &Self::repo_path(coords, "/git/blobs"))?.json(&body);
        let response = self.send(request, context).await?;
        let blob: GitObject = Self::json(response, context).await?;
        Ok(blob.sha)
    }

    async fn create_tree(&self, coords: &RepoCoords, base_tree: &str, entries: &[TreeEntry]) -> AppResult<String> {
        let context = "Failed to create tree";
        let body = CreateTreeRequest { base_tree, tree: entries };
        let request = self.request(Method::POST, &Self::repo_path(coords, "/git/trees"))?.json(&body);
        let response = self.send(request, context).await?;
        let tree: GitObject = Self::json(response, context).await?;
        Ok(tree.sha)
    }

    async fn create_commit(&self, coords: &RepoCoords, commit: &NewCommit) -> AppResult<String> {
        let context = "Failed to create commit";
        let body = CreateCommitRequest {
            message: &commit.message,
            tree: &commit.tree_sha,
            parents: &commit.parents,
            author: &commit.author,
            committer: &commit.committer,
        };
        let request = self.request(Method::POST, &Self::repo_path(coords, "/git/commits"))?.json(&body);
        let response = self.send(request, context).await?;
        let created: GitObject = Self::json(response, context).await?;
        Ok(created.sha)
    }

    async fn update_ref(&self, coords: &RepoCoords, branch: &str, sha: &str, force: bool) -> AppResult<()> {
        let context = format!("Failed to update branch {}", branch);
        let body = UpdateRefRequest { sha, force };
        let request = self
            .request(Method::PATCH, &Self::repo_path(coords, &format!("/git/refs/heads/{}", branch)))?
            .json(&body);

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Network(format!("{}: {}", context, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(ref_update_error(status, &error_text, &context, force))
    }
}
