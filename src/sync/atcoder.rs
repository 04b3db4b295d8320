use crate::config::AtCoderConfig;
use crate::core::data::Submission;
use crate::core::traits::SubmissionFeed;
use crate::utils::error::{AppError, AppResult};
use crate::utils::html::decode_entities;
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

/// Most records the submissions API returns for one request.
pub const PAGE_LIMIT: usize = 500;

const USER_AGENT: &str = concat!("atcoder-committer/", env!("CARGO_PKG_VERSION"));

static SUBMISSION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<pre\b[^>]*\sid\s*=\s*["']submission-code["'][^>]*>(.*?)</pre>"#)
        .expect("submission code pattern is valid")
});

pub struct AtCoderClient {
    client: Client,
    api_base_url: String,
    site_base_url: String,
    max_pages: usize,
    page_delay: Duration,
}

impl AtCoderClient {
    pub fn new(config: &AtCoderConfig) -> AppResult<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(config.timeout())
                .build()
                .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            site_base_url: config.site_base_url.trim_end_matches('/').to_string(),
            max_pages: config.max_pages,
            page_delay: config.page_delay(),
        })
    }

    async fn fetch_page(&self, user: &str, from_second: u64) -> AppResult<Vec<Submission>> {
        let url = format!("{}/user/submissions", self.api_base_url);
        tracing::debug!(%user, from_second, "fetching submissions page");

        let response = self
            .client
            .get(&url)
            .query(&[("user", user.to_string()), ("from_second", from_second.to_string())])
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to fetch submissions: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Network("Submission feed is rate limiting requests".to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Protocol(format!(
                "Failed to fetch submissions: {} - {}",
                status, error_text
            )));
        }

        response.json::<Vec<Submission>>().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Network(format!("Timed out reading submissions: {}", e))
            } else {
                AppError::Protocol(format!("Failed to parse submissions response: {}", e))
            }
        })
    }
}

/// Append the records of `page` not already in `batch`.
fn absorb_page(batch: &mut Vec<Submission>, seen: &mut HashSet<u64>, page: Vec<Submission>) {
    for submission in page {
        if seen.insert(submission.id) {
            batch.push(submission);
        }
    }
}

/// Where the next page starts, or `None` when `page` was the last one.
///
/// The API is inclusive on `from_second`, so the next request starts at the
/// last record's second and overlapping records are dropped by id.
fn next_page_start(page: &[Submission], from_second: u64) -> AppResult<Option<u64>> {
    if page.len() < PAGE_LIMIT {
        return Ok(None);
    }

    let last = page
        .last()
        .map(|s| u64::try_from(s.epoch_second).unwrap_or(0))
        .unwrap_or(from_second);

    if last <= from_second {
        return Err(AppError::Protocol(format!(
            "Submission feed returned a full page within second {}; cannot page further",
            from_second
        )));
    }

    Ok(Some(last))
}

/// Pull the code block out of a submission page.
pub fn extract_submission_code(html: &str) -> AppResult<String> {
    let caps = SUBMISSION_CODE
        .captures(html)
        .ok_or_else(|| AppError::Extraction("Submission code block not found on page".to_string()))?;
    Ok(decode_entities(&caps[1]))
}

#[async_trait]
impl SubmissionFeed for AtCoderClient {
    async fn fetch_submissions(&self, user: &str, from_second: u64) -> AppResult<Vec<Submission>> {
        let mut batch = Vec::new();
        let mut seen = HashSet::new();
        let mut from = from_second;

        for page_number in 0..self.max_pages {
            if page_number > 0 {
                tokio::time::sleep(self.page_delay).await;
            }

            let page = self.fetch_page(user, from).await?;
            let next = next_page_start(&page, from)?;
            absorb_page(&mut batch, &mut seen, page);

            match next {
                Some(next_from) => from = next_from,
                None => {
                    tracing::debug!(count = batch.len(), pages = page_number + 1, "submissions fetched");
                    return Ok(batch);
                }
            }
        }

        Err(AppError::Protocol(format!(
            "Submission feed still had more pages after {} requests; refusing a partial batch",
            self.max_pages
        )))
    }

    async fn fetch_source_code(&self, contest_id: &str, submission_id: u64) -> AppResult<String> {
        let url = format!("{}/contests/{}/submissions/{}", self.site_base_url, contest_id, submission_id);
        tracing::debug!(%url, "fetching submission page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to fetch submission {}: {}", submission_id, e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(AppError::Network(format!(
                "Submission page {} unavailable: {}",
                submission_id, status
            )));
        }
        if !status.is_success() {
            return Err(AppError::Extraction(format!(
                "Submission page {} returned {}",
                submission_id, status
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read submission {}: {}", submission_id, e)))?;

        extract_submission_code(&html)
            .map_err(|e| AppError::Extraction(format!("Submission {}: {}", submission_id, e)))
    }
}
