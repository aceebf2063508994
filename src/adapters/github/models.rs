//! GitHub REST API response models.
//!
//! These structs map to the subset of the GitHub REST API v3 JSON payloads
//! the domain remotes read. Unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A user or organization reference embedded in other payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubActor {
    /// Account login name.
    pub login: String,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: String,
    /// Profile page URL.
    #[serde(default)]
    pub html_url: String,
}

/// Author block inside a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubCommitAuthor {
    /// Author name as recorded in git.
    pub name: String,
    /// Author email as recorded in git.
    #[serde(default)]
    pub email: String,
    /// ISO 8601 timestamp.
    pub date: String,
}

/// Git-level commit data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubCommitDetail {
    /// Full commit message.
    pub message: String,
    /// Git author and timestamp.
    pub author: GitHubCommitAuthor,
}

/// A commit returned by `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubCommit {
    /// Commit hash.
    pub sha: String,
    /// Git-level commit data.
    pub commit: GitHubCommitDetail,
    /// GitHub account linked to the commit; null for unknown emails.
    #[serde(default)]
    pub author: Option<GitHubActor>,
    /// Commit page URL.
    #[serde(default)]
    pub html_url: String,
}

impl GitHubCommit {
    /// First line of the commit message.
    pub fn headline(&self) -> &str {
        self.commit.message.lines().next().unwrap_or_default()
    }
}

/// Repository reference inside an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubEventRepo {
    /// `owner/repo` name.
    pub name: String,
}

/// Message of a commit pushed in a `PushEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubPayloadCommit {
    /// Full commit message.
    pub message: String,
}

/// Titled payload object (pull request or issue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubTitled {
    /// Title shown on GitHub.
    pub title: String,
}

/// Event payload; only the fields rendered by the traffic page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubEventPayload {
    /// Action performed, e.g. `opened`.
    #[serde(default)]
    pub action: Option<String>,
    /// Commits pushed by a `PushEvent`.
    #[serde(default)]
    pub commits: Option<Vec<GitHubPayloadCommit>>,
    /// Pull request the event refers to.
    #[serde(default)]
    pub pull_request: Option<GitHubTitled>,
    /// Issue the event refers to.
    #[serde(default)]
    pub issue: Option<GitHubTitled>,
}

/// An event returned by `GET /repos/{owner}/{repo}/events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubEvent {
    /// Event id.
    pub id: String,
    /// Event type, e.g. `PushEvent`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Account that triggered the event.
    pub actor: GitHubActor,
    /// Repository the event happened in.
    pub repo: GitHubEventRepo,
    /// ISO 8601 timestamp.
    pub created_at: String,
    /// Type-specific payload.
    #[serde(default)]
    pub payload: GitHubEventPayload,
}

impl GitHubEvent {
    /// Short human description taken from the payload.
    pub fn summary(&self) -> Option<String> {
        if let Some(pr) = &self.payload.pull_request {
            return Some(pr.title.clone());
        }
        if let Some(issue) = &self.payload.issue {
            return Some(issue.title.clone());
        }
        self.payload
            .commits
            .as_ref()
            .and_then(|commits| commits.first())
            .map(|c| c.message.lines().next().unwrap_or_default().to_string())
    }
}

/// A contributor returned by `GET /repos/{owner}/{repo}/contributors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubContributor {
    /// Account login name.
    pub login: String,
    /// Numeric account id.
    pub id: u64,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: String,
    /// Profile page URL.
    #[serde(default)]
    pub html_url: String,
    /// Commits counted for this repository.
    pub contributions: u64,
    /// `User` or `Bot`.
    #[serde(rename = "type", default)]
    pub account_type: String,
}

/// A user returned by `GET /users/{username}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    /// Account login name.
    pub login: String,
    /// Numeric account id.
    pub id: u64,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: String,
    /// Profile page URL.
    #[serde(default)]
    pub html_url: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Company from the profile.
    #[serde(default)]
    pub company: Option<String>,
    /// Website from the profile.
    #[serde(default)]
    pub blog: String,
    /// Location from the profile.
    #[serde(default)]
    pub location: Option<String>,
    /// Public email.
    #[serde(default)]
    pub email: Option<String>,
    /// Profile bio.
    #[serde(default)]
    pub bio: Option<String>,
    /// Number of public repositories.
    #[serde(default)]
    pub public_repos: u64,
    /// Number of public gists.
    #[serde(default)]
    pub public_gists: u64,
    /// Follower count.
    #[serde(default)]
    pub followers: u64,
    /// Number of accounts followed.
    #[serde(default)]
    pub following: u64,
    /// ISO 8601 creation timestamp.
    #[serde(default)]
    pub created_at: String,
}

/// An organization returned by `GET /orgs/{org}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubOrg {
    /// Organization login name.
    pub login: String,
    /// Numeric organization id.
    pub id: u64,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: String,
    /// Organization description.
    #[serde(default)]
    pub description: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Website.
    #[serde(default)]
    pub blog: String,
    /// Location.
    #[serde(default)]
    pub location: Option<String>,
    /// Number of public repositories.
    #[serde(default)]
    pub public_repos: u64,
    /// Follower count.
    #[serde(default)]
    pub followers: u64,
}

/// License block of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubLicense {
    /// License name.
    pub name: String,
    /// SPDX identifier, when recognised.
    #[serde(default)]
    pub spdx_id: Option<String>,
}

/// A repository returned by `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRepo {
    /// Numeric repository id.
    pub id: u64,
    /// Repository name.
    pub name: String,
    /// `owner/repo` name.
    pub full_name: String,
    /// Repository description.
    #[serde(default)]
    pub description: Option<String>,
    /// Repository page URL.
    #[serde(default)]
    pub html_url: String,
    /// Star count.
    #[serde(default)]
    pub stargazers_count: u64,
    /// Watcher count.
    #[serde(default)]
    pub watchers_count: u64,
    /// Fork count.
    #[serde(default)]
    pub forks_count: u64,
    /// Open issues and pull requests.
    #[serde(default)]
    pub open_issues_count: u64,
    /// Primary language.
    #[serde(default)]
    pub language: Option<String>,
    /// Repository topics.
    #[serde(default)]
    pub topics: Vec<String>,
    /// ISO 8601 creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// ISO 8601 timestamp of the last metadata update.
    #[serde(default)]
    pub updated_at: String,
    /// ISO 8601 timestamp of the last push.
    #[serde(default)]
    pub pushed_at: String,
    /// Repository size in KiB.
    #[serde(default)]
    pub size: u64,
    /// Default branch name.
    #[serde(default)]
    pub default_branch: String,
    /// Detected license.
    #[serde(default)]
    pub license: Option<GitHubLicense>,
    /// Owning account.
    pub owner: GitHubActor,
}

/// Bytes of code per language, from `GET /repos/{owner}/{repo}/languages`.
pub type GitHubLanguages = BTreeMap<String, u64>;

/// A release returned by `GET /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRelease {
    /// Numeric release id.
    pub id: u64,
    /// Git tag of the release.
    pub tag_name: String,
    /// Release title.
    #[serde(default)]
    pub name: Option<String>,
    /// ISO 8601 publication timestamp; unset for drafts.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Release page URL.
    #[serde(default)]
    pub html_url: String,
    /// Marked as a pre-release.
    #[serde(default)]
    pub prerelease: bool,
    /// Not yet published.
    #[serde(default)]
    pub draft: bool,
    /// Account that created the release.
    pub author: GitHubActor,
}
