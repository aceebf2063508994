//! Aggregates derived from raw GitHub payloads.
//!
//! Each domain remote caches one of these under its own query key.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{
    GitHubCommit, GitHubContributor, GitHubEvent, GitHubLanguages, GitHubOrg, GitHubRelease,
    GitHubRepo,
};

/// Number of commits and events kept for display.
const RECENT_LIMIT: usize = 10;

/// Number of contributors listed on the admin page.
const TOP_CONTRIBUTORS_LIMIT: usize = 20;

/// Activity summary for the traffic page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficStats {
    /// Commits fetched.
    pub total_commits: usize,
    /// Events fetched.
    pub total_events: usize,
    /// Distinct commit authors with a GitHub account.
    pub unique_contributors: usize,
    /// ISO 8601 timestamp of the newest commit.
    pub last_activity: String,
    /// Newest commits, at most ten.
    pub recent_commits: Vec<GitHubCommit>,
    /// Newest events, at most ten.
    pub recent_events: Vec<GitHubEvent>,
}

impl TrafficStats {
    /// Combine commits and events; `now` stands in when there are no commits.
    pub fn from_activity(
        mut commits: Vec<GitHubCommit>,
        mut events: Vec<GitHubEvent>,
        now: DateTime<Utc>,
    ) -> Self {
        let unique_contributors = commits
            .iter()
            .filter_map(|c| c.author.as_ref().map(|a| a.login.as_str()))
            .collect::<HashSet<_>>()
            .len();

        let last_activity = commits
            .first()
            .map_or_else(|| now.to_rfc3339(), |c| c.commit.author.date.clone());

        let total_commits = commits.len();
        let total_events = events.len();
        commits.truncate(RECENT_LIMIT);
        events.truncate(RECENT_LIMIT);

        Self {
            total_commits,
            total_events,
            unique_contributors,
            last_activity,
            recent_commits: commits,
            recent_events: events,
        }
    }
}

/// Share of a repository's code in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    /// Language name.
    pub name: String,
    /// Bytes of code.
    pub bytes: u64,
    /// Percentage rounded to one decimal.
    pub percentage: f64,
}

/// Repository report for the reports page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoReport {
    /// Repository metadata.
    pub repo: GitHubRepo,
    /// Bytes of code per language.
    pub languages: GitHubLanguages,
    /// Latest releases.
    pub releases: Vec<GitHubRelease>,
    /// Sorted by bytes, largest first.
    pub language_percentages: Vec<LanguageShare>,
    /// Sum of all language bytes.
    pub total_bytes: u64,
}

impl RepoReport {
    /// Build the report and its language breakdown.
    pub fn compose(repo: GitHubRepo, languages: GitHubLanguages, releases: Vec<GitHubRelease>) -> Self {
        let total_bytes: u64 = languages.values().sum();

        let mut language_percentages: Vec<LanguageShare> = languages
            .iter()
            .map(|(name, &bytes)| LanguageShare {
                name: name.clone(),
                bytes,
                percentage: percentage_of(bytes, total_bytes),
            })
            .collect();
        language_percentages.sort_by(|a, b| b.bytes.cmp(&a.bytes));

        Self {
            repo,
            languages,
            releases,
            language_percentages,
            total_bytes,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((part as f64 / total as f64) * 1000.0).round() / 10.0
}

/// Contributor statistics for the admin page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    /// Contributors fetched.
    pub total_contributors: usize,
    /// Sum of their contributions.
    pub total_contributions: u64,
    /// Leading contributors, at most twenty.
    pub top_contributors: Vec<GitHubContributor>,
    /// `None` when the owner is a user rather than an organization.
    pub org_info: Option<GitHubOrg>,
}

impl AdminStats {
    /// Summarize `contributors`, keeping the leading ones.
    pub fn compose(mut contributors: Vec<GitHubContributor>, org_info: Option<GitHubOrg>) -> Self {
        let total_contributions = contributors.iter().map(|c| c.contributions).sum();
        let total_contributors = contributors.len();
        contributors.truncate(TOP_CONTRIBUTORS_LIMIT);

        Self {
            total_contributors,
            total_contributions,
            top_contributors: contributors,
            org_info,
        }
    }
}

/// Role badge derived from a contributor's contribution count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributorRole {
    /// 1000 contributions or more.
    Core,
    /// 100 or more.
    Active,
    /// 10 or more.
    Regular,
    /// Fewer than 10.
    Contributor,
}

impl ContributorRole {
    /// Role for a contribution count.
    pub const fn from_contributions(contributions: u64) -> Self {
        match contributions {
            1000.. => Self::Core,
            100.. => Self::Active,
            10.. => Self::Regular,
            _ => Self::Contributor,
        }
    }

    /// Badge text.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::Active => "Active",
            Self::Regular => "Regular",
            Self::Contributor => "Contributor",
        }
    }
}

/// Human-readable label for a GitHub event type.
pub fn format_event_type(event_type: &str) -> String {
    let label = match event_type {
        "PushEvent" => "Push",
        "PullRequestEvent" => "Pull Request",
        "IssuesEvent" => "Issue",
        "IssueCommentEvent" => "Comment",
        "CreateEvent" => "Create",
        "DeleteEvent" => "Delete",
        "WatchEvent" => "Star",
        "ForkEvent" => "Fork",
        "ReleaseEvent" => "Release",
        other => return other.replacen("Event", "", 1),
    };
    label.to_string()
}

/// Compact number: `1.2K`, `3.4M`.
#[allow(clippy::cast_precision_loss)]
pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Relative age of an ISO 8601 timestamp: `5m ago`, `3h ago`, `2d ago`.
pub fn time_ago(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let elapsed = now.signed_duration_since(then.with_timezone(&Utc));
    let minutes = elapsed.num_minutes().max(0);
    if minutes < 60 {
        format!("{minutes}m ago")
    } else if minutes < 60 * 24 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::github::models::{GitHubActor, GitHubCommitAuthor, GitHubCommitDetail};

    fn commit(sha: &str, login: Option<&str>, date: &str) -> GitHubCommit {
        GitHubCommit {
            sha: sha.to_string(),
            commit: GitHubCommitDetail {
                message: format!("commit {sha}"),
                author: GitHubCommitAuthor {
                    name: "dev".to_string(),
                    email: String::new(),
                    date: date.to_string(),
                },
            },
            author: login.map(|l| GitHubActor {
                login: l.to_string(),
                avatar_url: String::new(),
                html_url: String::new(),
            }),
            html_url: String::new(),
        }
    }

    fn contributor(login: &str, contributions: u64) -> GitHubContributor {
        GitHubContributor {
            login: login.to_string(),
            id: 1,
            avatar_url: String::new(),
            html_url: String::new(),
            contributions,
            account_type: "User".to_string(),
        }
    }

    #[test]
    fn test_traffic_stats_counts_unique_authors() {
        let commits: Vec<_> = (0..15)
            .map(|i| {
                let login = match i % 3 {
                    0 => Some("alice"),
                    1 => Some("bob"),
                    _ => None,
                };
                commit(&i.to_string(), login, "2024-05-01T10:00:00Z")
            })
            .collect();

        let stats = TrafficStats::from_activity(commits, vec![], Utc::now());
        assert_eq!(stats.total_commits, 15);
        assert_eq!(stats.unique_contributors, 2);
        assert_eq!(stats.recent_commits.len(), 10);
        assert_eq!(stats.last_activity, "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_traffic_stats_without_commits_uses_now() {
        let now = Utc::now();
        let stats = TrafficStats::from_activity(vec![], vec![], now);
        assert_eq!(stats.last_activity, now.to_rfc3339());
        assert_eq!(stats.unique_contributors, 0);
    }

    #[test]
    fn test_language_percentages_sorted_and_rounded() {
        let repo: GitHubRepo = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "typescript", "full_name": "microsoft/typescript",
            "owner": {"login": "microsoft"}
        }))
        .unwrap();
        let mut languages = GitHubLanguages::new();
        languages.insert("JavaScript".to_string(), 1);
        languages.insert("TypeScript".to_string(), 2);

        let report = RepoReport::compose(repo, languages, vec![]);
        assert_eq!(report.total_bytes, 3);
        assert_eq!(report.language_percentages[0].name, "TypeScript");
        assert!((report.language_percentages[0].percentage - 66.7).abs() < f64::EPSILON);
        assert!((report.language_percentages[1].percentage - 33.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_of_empty_repo_is_zero() {
        assert!(percentage_of(0, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_admin_stats_totals_and_top_limit() {
        let contributors: Vec<_> = (0..30).map(|i| contributor(&format!("c{i}"), 10)).collect();
        let stats = AdminStats::compose(contributors, None);
        assert_eq!(stats.total_contributors, 30);
        assert_eq!(stats.total_contributions, 300);
        assert_eq!(stats.top_contributors.len(), 20);
        assert!(stats.org_info.is_none());
    }

    #[test]
    fn test_contributor_roles() {
        assert_eq!(ContributorRole::from_contributions(1500), ContributorRole::Core);
        assert_eq!(ContributorRole::from_contributions(100), ContributorRole::Active);
        assert_eq!(ContributorRole::from_contributions(10), ContributorRole::Regular);
        assert_eq!(ContributorRole::from_contributions(9).label(), "Contributor");
    }

    #[test]
    fn test_format_event_type() {
        assert_eq!(format_event_type("PullRequestEvent"), "Pull Request");
        assert_eq!(format_event_type("WatchEvent"), "Star");
        assert_eq!(format_event_type("GollumEvent"), "Gollum");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_234), "1.2K");
        assert_eq!(format_number(3_400_000), "3.4M");
    }

    #[test]
    fn test_time_ago() {
        let now = DateTime::parse_from_rfc3339("2024-05-02T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(time_ago("2024-05-02T09:30:00Z", now), "30m ago");
        assert_eq!(time_ago("2024-05-02T07:00:00Z", now), "3h ago");
        assert_eq!(time_ago("2024-04-30T10:00:00Z", now), "2d ago");
        assert_eq!(time_ago("not a date", now), "not a date");
    }
}
