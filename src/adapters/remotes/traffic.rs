//! Traffic remote: recent activity of a GitHub repository.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::adapters::github::insights::{format_event_type, time_ago};
use crate::adapters::github::{GitHubClient, TrafficStats};
use crate::domain::errors::QueryError;
use crate::domain::models::config::RepoRef;
use crate::domain::models::{
    ExposedRoute, ListItem, NavMeta, PageView, QueryKey, QueryOptions, Section, SectionBody,
    StatCard,
};
use crate::domain::ports::{Page, RemoteModule};
use crate::query_key;
use crate::services::platform::PlatformContext;

use super::{resolve, Resolved};

/// Name the traffic remote registers under.
pub const REMOTE_NAME: &str = "traffic";
/// Id of the traffic home route.
pub const ROUTE_ID: &str = "traffic-home";

const COMMITS_PER_PAGE: u32 = 15;
const EVENTS_PER_PAGE: u32 = 20;
const STALE_TIME: Duration = Duration::from_secs(2 * 60);

/// Routes exposed by the traffic remote.
pub fn routes() -> Vec<ExposedRoute> {
    vec![ExposedRoute::new(
        ROUTE_ID,
        "/traffic",
        Some(NavMeta::new("Traffic", Some(1))),
    )]
}

/// Cache key of the activity summary for `repo`.
pub fn traffic_stats_key(repo: &RepoRef) -> QueryKey {
    query_key!["github", "traffic-stats", &repo.owner, &repo.repo]
}

/// Commits and events fetched concurrently, then summarized.
pub async fn fetch_traffic_stats(
    github: &GitHubClient,
    repo: &RepoRef,
) -> Result<TrafficStats, QueryError> {
    let (commits, events) = tokio::try_join!(
        github.list_commits(&repo.owner, &repo.repo, COMMITS_PER_PAGE),
        github.list_repo_events(&repo.owner, &repo.repo, EVENTS_PER_PAGE),
    )?;
    Ok(TrafficStats::from_activity(commits, events, Utc::now()))
}

/// Remote showing recent repository activity.
#[derive(Debug, Clone)]
pub struct TrafficRemote {
    github: GitHubClient,
    repo: RepoRef,
}

impl TrafficRemote {
    /// Remote tracking `repo`.
    pub const fn new(github: GitHubClient, repo: RepoRef) -> Self {
        Self { github, repo }
    }
}

impl RemoteModule for TrafficRemote {
    fn name(&self) -> &str {
        REMOTE_NAME
    }

    fn routes(&self) -> Vec<ExposedRoute> {
        routes()
    }

    fn page(&self, route_id: &str) -> Option<Arc<dyn Page>> {
        (route_id == ROUTE_ID).then(|| {
            Arc::new(TrafficHome {
                github: self.github.clone(),
                repo: self.repo.clone(),
            }) as Arc<dyn Page>
        })
    }
}

struct TrafficHome {
    github: GitHubClient,
    repo: RepoRef,
}

impl TrafficHome {
    async fn stats(&self, ctx: &PlatformContext) -> Resolved<TrafficStats> {
        let github = self.github.clone();
        let repo = self.repo.clone();
        resolve(
            ctx,
            traffic_stats_key(&self.repo),
            QueryOptions::stale_time(STALE_TIME),
            move || async move { fetch_traffic_stats(&github, &repo).await },
        )
        .await
    }
}

#[async_trait]
impl Page for TrafficHome {
    async fn render(&self, ctx: &PlatformContext) -> PageView {
        let (greeting, stats) = tokio::join!(ctx.greeting(), self.stats(ctx));

        let view = PageView::new("GitHub Activity Tracker")
            .with_subtitle(format!(
                "Live activity for {}/{}",
                self.repo.owner, self.repo.repo
            ))
            .with_greeting(greeting)
            .refreshable();

        stats.render(view, skeleton, content)
    }

    async fn refresh(&self, ctx: &PlatformContext) {
        ctx.query_client.invalidate(&traffic_stats_key(&self.repo));
        self.stats(ctx).await;
    }
}

fn skeleton(view: PageView) -> PageView {
    view.with_section(Section::loading("Overview", 4))
        .with_section(Section::loading("Recent Commits", 5))
        .with_section(Section::loading("Recent Events", 5))
}

fn content(view: PageView, stats: &TrafficStats) -> PageView {
    let now = Utc::now();
    let cards = vec![
        StatCard::new("Total Commits", stats.total_commits.to_string()),
        StatCard::new("Total Events", stats.total_events.to_string()),
        StatCard::new("Contributors", stats.unique_contributors.to_string()),
        StatCard::new("Last Activity", time_ago(&stats.last_activity, now)),
    ];

    let commits = stats
        .recent_commits
        .iter()
        .map(|c| {
            let who = c
                .author
                .as_ref()
                .map_or(c.commit.author.name.as_str(), |a| a.login.as_str());
            let short_sha: String = c.sha.chars().take(7).collect();
            ListItem::new(c.headline())
                .with_detail(format!(
                    "{who} · {} · {short_sha}",
                    time_ago(&c.commit.author.date, now)
                ))
                .with_link(c.html_url.clone())
        })
        .collect();

    let events = stats
        .recent_events
        .iter()
        .map(|e| {
            let ago = time_ago(&e.created_at, now);
            let detail = e
                .summary()
                .map_or_else(|| ago.clone(), |summary| format!("{summary} · {ago}"));
            ListItem::new(e.actor.login.clone())
                .with_badge(format_event_type(&e.event_type))
                .with_detail(detail)
        })
        .collect();

    view.with_section(Section::new("Overview", SectionBody::Stats { cards }))
        .with_section(Section::new("Recent Commits", SectionBody::List { items: commits }))
        .with_section(Section::new("Recent Events", SectionBody::List { items: events }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_metadata() {
        let routes = routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].id, "traffic-home");
        assert_eq!(routes[0].nav.as_ref().unwrap().order, Some(1));
    }

    #[test]
    fn test_key_includes_repository() {
        let key = traffic_stats_key(&RepoRef::new("facebook", "react"));
        assert_eq!(key.to_string(), r#"["github","traffic-stats","facebook","react"]"#);
    }

    #[test]
    fn test_unknown_route_has_no_page() {
        let remote = TrafficRemote::new(
            GitHubClient::new("http://localhost", None),
            RepoRef::new("facebook", "react"),
        );
        assert!(remote.page("traffic-home").is_some());
        assert!(remote.page("traffic-daily").is_none());
    }
}
