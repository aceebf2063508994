//! Configuration model for the shell and standalone remotes.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration structure for the shell and standalone remotes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote bundles keyed by remote name
    #[serde(default = "default_remotes")]
    pub remotes: BTreeMap<String, RemoteConfig>,

    /// Shared query cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// GitHub REST API configuration
    #[serde(default)]
    pub github: GitHubConfig,

    /// Account provider configuration
    #[serde(default)]
    pub account: AccountConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            remotes: default_remotes(),
            cache: CacheConfig::default(),
            github: GitHubConfig::default(),
            account: AccountConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Configuration of a named remote.
    pub fn remote(&self, name: &str) -> Option<&RemoteConfig> {
        self.remotes.get(name)
    }
}

/// Built-in remotes with their local development addresses.
pub fn default_remotes() -> BTreeMap<String, RemoteConfig> {
    [
        ("traffic", "http://localhost:3002"),
        ("reports", "http://localhost:3003"),
        ("admin", "http://localhost:3004"),
    ]
    .into_iter()
    .map(|(name, url)| (name.to_string(), RemoteConfig::local(url)))
    .collect()
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the shell listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Send permissive CORS headers
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: true,
        }
    }
}

/// How a remote's code is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteMode {
    /// Compiled into this binary
    Local,
    /// Served by another process at `url`
    Remote,
}

/// Configuration of one remote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RemoteConfig {
    /// Where the remote's code comes from
    #[serde(default = "default_remote_mode")]
    pub mode: RemoteMode,

    /// Base URL of the standalone remote
    pub url: String,

    /// Route overrides; required for remotes the shell does not know
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

const fn default_remote_mode() -> RemoteMode {
    RemoteMode::Local
}

impl RemoteConfig {
    /// Compiled-in remote; `url` is used by `mfe-shell remote`.
    pub fn local(url: impl Into<String>) -> Self {
        Self {
            mode: RemoteMode::Local,
            url: url.into(),
            routes: Vec::new(),
        }
    }

    /// Remote loaded from its entry at `url`.
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            mode: RemoteMode::Remote,
            url: url.into(),
            routes: Vec::new(),
        }
    }

    /// Port parsed from the remote URL, if any.
    pub fn port(&self) -> Option<u16> {
        let after_scheme = self.url.split("://").nth(1).unwrap_or(&self.url);
        let authority = after_scheme.split('/').next()?;
        authority.rsplit_once(':')?.1.parse().ok()
    }
}

/// A route declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RouteConfig {
    /// Route id.
    pub id: String,
    /// Absolute path.
    pub path: String,
    /// Sidebar label; hidden when unset.
    #[serde(default)]
    pub label: Option<String>,
    /// Sidebar position.
    #[serde(default)]
    pub order: Option<i32>,
}

/// Shared query cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Default freshness window in milliseconds
    #[serde(default = "default_stale_time_ms")]
    pub stale_time_ms: u64,

    /// How long a page waits for its queries before rendering skeletons
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// How long navigation waits for a remote to load before showing a placeholder
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,

    /// Upper bound on one HTTP request to a standalone remote
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

const fn default_stale_time_ms() -> u64 {
    60_000
}

const fn default_render_timeout_ms() -> u64 {
    3_000
}

const fn default_load_timeout_ms() -> u64 {
    5_000
}

const fn default_request_timeout_ms() -> u64 {
    3_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time_ms: default_stale_time_ms(),
            render_timeout_ms: default_render_timeout_ms(),
            load_timeout_ms: default_load_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl CacheConfig {
    /// Default freshness window.
    pub const fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms)
    }

    /// How long a page waits for its queries.
    pub const fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    /// How long navigation waits for a remote.
    pub const fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// Upper bound on one request to a remote.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Repository coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// User or organization.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoRef {
    /// Reference to `owner/repo`.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

/// GitHub REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubConfig {
    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Optional personal access token
    #[serde(default)]
    pub token: Option<String>,

    /// Hourly request budget; defaults to GitHub's limit for the auth mode
    #[serde(default)]
    pub requests_per_hour: Option<u32>,

    /// Per-request timeout in seconds
    #[serde(default = "default_github_timeout_secs")]
    pub timeout_secs: u64,

    /// Repository tracked by the traffic remote
    #[serde(default = "default_traffic_repo")]
    pub traffic_repo: RepoRef,

    /// Repository reported on by the reports remote
    #[serde(default = "default_reports_repo")]
    pub reports_repo: RepoRef,

    /// Repository whose contributors the admin remote lists
    #[serde(default = "default_admin_repo")]
    pub admin_repo: RepoRef,
}

const fn default_github_timeout_secs() -> u64 {
    10
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_traffic_repo() -> RepoRef {
    RepoRef::new("facebook", "react")
}

fn default_reports_repo() -> RepoRef {
    RepoRef::new("microsoft", "typescript")
}

fn default_admin_repo() -> RepoRef {
    RepoRef::new("vercel", "next.js")
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token: None,
            requests_per_hour: None,
            timeout_secs: default_github_timeout_secs(),
            traffic_repo: default_traffic_repo(),
            reports_repo: default_reports_repo(),
            admin_repo: default_admin_repo(),
        }
    }
}

impl GitHubConfig {
    /// Per-request timeout.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Account provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccountConfig {
    /// Simulated latency of the account source in milliseconds
    #[serde(default = "default_account_delay_ms")]
    pub simulated_delay_ms: u64,
}

const fn default_account_delay_ms() -> u64 {
    500
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            simulated_delay_ms: default_account_delay_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation (daily, hourly, never)
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
