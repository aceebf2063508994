//! Admin remote: contributors and organization of a GitHub repository.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::adapters::github::insights::{format_number, ContributorRole};
use crate::adapters::github::{AdminStats, GitHubClient};
use crate::domain::errors::QueryError;
use crate::domain::models::config::RepoRef;
use crate::domain::models::{
    ExposedRoute, NavMeta, PageView, QueryKey, QueryOptions, Section, SectionBody, StatCard,
};
use crate::domain::ports::{Page, RemoteModule};
use crate::query_key;
use crate::services::platform::PlatformContext;

use super::{resolve, Resolved};

/// Name the admin remote registers under.
pub const REMOTE_NAME: &str = "admin";
/// Id of the admin home route.
pub const ROUTE_ID: &str = "admin-home";

const CONTRIBUTORS_PER_PAGE: u32 = 30;
const STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Routes exposed by the admin remote.
pub fn routes() -> Vec<ExposedRoute> {
    vec![ExposedRoute::new(
        ROUTE_ID,
        "/admin",
        Some(NavMeta::new("Admin", Some(3))),
    )]
}

/// Cache key of the contributor summary for `repo`.
pub fn admin_stats_key(repo: &RepoRef) -> QueryKey {
    query_key!["github", "admin-stats", &repo.owner, &repo.repo]
}

/// Contributors are required; the organization lookup fails for user-owned
/// repositories and is dropped.
pub async fn fetch_admin_stats(github: &GitHubClient, repo: &RepoRef) -> Result<AdminStats, QueryError> {
    let (contributors, org) = tokio::join!(
        github.list_contributors(&repo.owner, &repo.repo, CONTRIBUTORS_PER_PAGE),
        github.get_org(&repo.owner),
    );
    let org = org
        .map_err(|err| tracing::debug!(owner = %repo.owner, error = %err, "organization lookup failed"))
        .ok();
    Ok(AdminStats::compose(contributors?, org))
}

/// Remote listing a repository's contributors.
#[derive(Debug, Clone)]
pub struct AdminRemote {
    github: GitHubClient,
    repo: RepoRef,
}

impl AdminRemote {
    /// Remote for `repo`.
    pub const fn new(github: GitHubClient, repo: RepoRef) -> Self {
        Self { github, repo }
    }
}

impl RemoteModule for AdminRemote {
    fn name(&self) -> &str {
        REMOTE_NAME
    }

    fn routes(&self) -> Vec<ExposedRoute> {
        routes()
    }

    fn page(&self, route_id: &str) -> Option<Arc<dyn Page>> {
        (route_id == ROUTE_ID).then(|| {
            Arc::new(AdminHome {
                github: self.github.clone(),
                repo: self.repo.clone(),
            }) as Arc<dyn Page>
        })
    }
}

struct AdminHome {
    github: GitHubClient,
    repo: RepoRef,
}

impl AdminHome {
    async fn stats(&self, ctx: &PlatformContext) -> Resolved<AdminStats> {
        let github = self.github.clone();
        let repo = self.repo.clone();
        resolve(
            ctx,
            admin_stats_key(&self.repo),
            QueryOptions::stale_time(STALE_TIME),
            move || async move { fetch_admin_stats(&github, &repo).await },
        )
        .await
    }
}

#[async_trait]
impl Page for AdminHome {
    async fn render(&self, ctx: &PlatformContext) -> PageView {
        let (greeting, stats) = tokio::join!(ctx.greeting(), self.stats(ctx));

        let view = PageView::new("Admin Panel")
            .with_subtitle(format!(
                "Contributors to {}/{}",
                self.repo.owner, self.repo.repo
            ))
            .with_greeting(greeting)
            .refreshable();

        stats.render(view, skeleton, content)
    }

    async fn refresh(&self, ctx: &PlatformContext) {
        ctx.query_client.invalidate(&admin_stats_key(&self.repo));
        self.stats(ctx).await;
    }
}

fn skeleton(view: PageView) -> PageView {
    view.with_section(Section::loading("Overview", 4))
        .with_section(Section::loading("Top Contributors", 5))
}

fn content(view: PageView, stats: &AdminStats) -> PageView {
    let (org_name, public_repos) = stats.org_info.as_ref().map_or_else(
        || ("n/a".to_string(), "n/a".to_string()),
        |org| {
            (
                org.name.clone().unwrap_or_else(|| org.login.clone()),
                format_number(org.public_repos),
            )
        },
    );

    let cards = vec![
        StatCard::new("Contributors", stats.total_contributors.to_string()),
        StatCard::new("Total Contributions", format_number(stats.total_contributions)),
        StatCard::new("Organization", org_name),
        StatCard::new("Public Repos", public_repos),
    ];

    let rows = stats
        .top_contributors
        .iter()
        .map(|c| {
            vec![
                c.login.clone(),
                format_number(c.contributions),
                ContributorRole::from_contributions(c.contributions)
                    .label()
                    .to_string(),
            ]
        })
        .collect();

    view.with_section(Section::new("Overview", SectionBody::Stats { cards }))
        .with_section(Section::new(
            "Top Contributors",
            SectionBody::Table {
                columns: vec![
                    "Contributor".to_string(),
                    "Contributions".to_string(),
                    "Role".to_string(),
                ],
                rows,
            },
        ))
}
