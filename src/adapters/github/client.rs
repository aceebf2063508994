//! GitHub HTTP client with rate limiting.
//!
//! Wraps the read-only subset of the GitHub REST API v3 used by the domain
//! remotes. A token-bucket limiter guards the hourly request budget: once the
//! bucket is empty, requests fail with [`QueryError::RateLimited`] instead of
//! waiting, so a page can show the error while the cache keeps its last value.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::errors::QueryError;
use crate::domain::models::config::GitHubConfig;

use super::models::{
    GitHubCommit, GitHubContributor, GitHubEvent, GitHubLanguages, GitHubOrg, GitHubRelease,
    GitHubRepo, GitHubUser,
};

/// Media type requested from the API.
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

const USER_AGENT: &str = "mfe-shell";

/// Upper bound on a single API request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Hourly budget for anonymous requests.
const UNAUTHENTICATED_LIMIT: u32 = 60;

/// Hourly budget for token-authenticated requests.
const AUTHENTICATED_LIMIT: u32 = 5_000;

/// Token-bucket rate limiter.
///
/// Allows up to `capacity` requests per `window`. The bucket refills when
/// the window elapses.
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum tokens in the bucket.
    capacity: u32,
    /// Current available tokens.
    tokens: u32,
    /// Duration of the refill window.
    window: Duration,
    /// When the current window started.
    window_start: Instant,
}

impl RateLimiter {
    /// Full bucket of `capacity` tokens per `window`.
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            tokens: capacity,
            window,
            window_start: Instant::now(),
        }
    }

    /// Take one token, or return how long until the window resets.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        if self.tokens > 0 {
            self.tokens -= 1;
            Ok(())
        } else {
            Err(self.window.saturating_sub(self.window_start.elapsed()))
        }
    }

    /// Tokens left in the current window.
    pub const fn remaining(&self) -> u32 {
        self.tokens
    }
}

/// HTTP client for the GitHub REST API v3.
///
/// Every method maps network failures to [`QueryError::Transport`], non-2xx
/// responses to [`QueryError::Http`] and malformed bodies to
/// [`QueryError::Decode`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
    /// Personal access token; requests are anonymous without one.
    token: Option<String>,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    timeout: Duration,
}

impl GitHubClient {
    /// Create a client against `api_base` with GitHub's default budget.
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        let token = token.filter(|t| !t.is_empty());
        let capacity = if token.is_some() {
            AUTHENTICATED_LIMIT
        } else {
            UNAUTHENTICATED_LIMIT
        };
        Self::with_budget(api_base, token, capacity)
    }

    /// Create a client with an explicit hourly request budget.
    pub fn with_budget(api_base: impl Into<String>, token: Option<String>, per_hour: u32) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(
                per_hour,
                Duration::from_secs(3_600),
            ))),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Fail requests that take longer than `timeout` with [`QueryError::Transport`].
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Client for the configured API base, token, budget and timeout.
    pub fn from_config(config: &GitHubConfig) -> Self {
        let client = match config.requests_per_hour {
            Some(per_hour) => Self::with_budget(&config.api_base, config.token.clone(), per_hour),
            None => Self::new(&config.api_base, config.token.clone()),
        };
        client.with_timeout(config.timeout())
    }

    /// Base URL requests are sent to.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// GET `path` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, QueryError> {
        if let Err(wait) = self.rate_limiter.lock().await.try_acquire() {
            tracing::warn!(endpoint = path, retry_after_secs = wait.as_secs(), "GitHub rate limit reached");
            return Err(QueryError::RateLimited {
                retry_after_secs: wait.as_secs(),
            });
        }

        let url = format!("{}{}", self.api_base, path);
        let mut req = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .header("Accept", GITHUB_ACCEPT)
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        tracing::debug!(endpoint = path, "GitHub request");
        let resp = req.send().await.map_err(|e| QueryError::Transport {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(endpoint = path, status = status.as_u16(), "GitHub request failed");
            return Err(QueryError::Http {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }

        resp.json::<T>().await.map_err(|e| QueryError::Decode {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Most recent commits on the default branch.
    pub async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> Result<Vec<GitHubCommit>, QueryError> {
        self.get_json(&format!("/repos/{owner}/{repo}/commits?per_page={per_page}"))
            .await
    }

    /// Most recent public events of a repository.
    pub async fn list_repo_events(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> Result<Vec<GitHubEvent>, QueryError> {
        self.get_json(&format!("/repos/{owner}/{repo}/events?per_page={per_page}"))
            .await
    }

    /// Top contributors by commit count.
    pub async fn list_contributors(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> Result<Vec<GitHubContributor>, QueryError> {
        self.get_json(&format!(
            "/repos/{owner}/{repo}/contributors?per_page={per_page}"
        ))
        .await
    }

    /// A user's public profile.
    pub async fn get_user(&self, username: &str) -> Result<GitHubUser, QueryError> {
        self.get_json(&format!("/users/{username}")).await
    }

    /// An organization's public profile.
    pub async fn get_org(&self, org: &str) -> Result<GitHubOrg, QueryError> {
        self.get_json(&format!("/orgs/{org}")).await
    }

    /// Repository metadata.
    pub async fn get_repo(&self, owner: &str, repo: &str) -> Result<GitHubRepo, QueryError> {
        self.get_json(&format!("/repos/{owner}/{repo}")).await
    }

    /// Bytes of code per language.
    pub async fn get_languages(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<GitHubLanguages, QueryError> {
        self.get_json(&format!("/repos/{owner}/{repo}/languages"))
            .await
    }

    /// Most recent releases first.
    pub async fn list_releases(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> Result<Vec<GitHubRelease>, QueryError> {
        self.get_json(&format!("/repos/{owner}/{repo}/releases?per_page={per_page}"))
            .await
    }
}
