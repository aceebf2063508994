//! Reports remote: a repository report with language breakdown and releases.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::adapters::github::insights::{format_number, time_ago};
use crate::adapters::github::{GitHubClient, RepoReport};
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

/// Name the reports remote registers under.
pub const REMOTE_NAME: &str = "reports";
/// Id of the reports home route.
pub const ROUTE_ID: &str = "reports-home";

const RELEASES_PER_PAGE: u32 = 10;
const STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Routes exposed by the reports remote.
pub fn routes() -> Vec<ExposedRoute> {
    vec![ExposedRoute::new(
        ROUTE_ID,
        "/reports",
        Some(NavMeta::new("Reports", Some(2))),
    )]
}

/// Cache key of the report for `repo`.
pub fn repo_report_key(repo: &RepoRef) -> QueryKey {
    query_key!["github", "repo-report", &repo.owner, &repo.repo]
}

/// Repository metadata, languages and releases, fetched concurrently.
pub async fn fetch_repo_report(github: &GitHubClient, repo: &RepoRef) -> Result<RepoReport, QueryError> {
    let (info, languages, releases) = tokio::try_join!(
        github.get_repo(&repo.owner, &repo.repo),
        github.get_languages(&repo.owner, &repo.repo),
        github.list_releases(&repo.owner, &repo.repo, RELEASES_PER_PAGE),
    )?;
    Ok(RepoReport::compose(info, languages, releases))
}

/// Remote summarizing one repository.
#[derive(Debug, Clone)]
pub struct ReportsRemote {
    github: GitHubClient,
    repo: RepoRef,
}

impl ReportsRemote {
    /// Remote reporting on `repo`.
    pub const fn new(github: GitHubClient, repo: RepoRef) -> Self {
        Self { github, repo }
    }
}

impl RemoteModule for ReportsRemote {
    fn name(&self) -> &str {
        REMOTE_NAME
    }

    fn routes(&self) -> Vec<ExposedRoute> {
        routes()
    }

    fn page(&self, route_id: &str) -> Option<Arc<dyn Page>> {
        (route_id == ROUTE_ID).then(|| {
            Arc::new(ReportsHome {
                github: self.github.clone(),
                repo: self.repo.clone(),
            }) as Arc<dyn Page>
        })
    }
}

struct ReportsHome {
    github: GitHubClient,
    repo: RepoRef,
}

impl ReportsHome {
    async fn report(&self, ctx: &PlatformContext) -> Resolved<RepoReport> {
        let github = self.github.clone();
        let repo = self.repo.clone();
        resolve(
            ctx,
            repo_report_key(&self.repo),
            QueryOptions::stale_time(STALE_TIME),
            move || async move { fetch_repo_report(&github, &repo).await },
        )
        .await
    }
}

#[async_trait]
impl Page for ReportsHome {
    async fn render(&self, ctx: &PlatformContext) -> PageView {
        let (greeting, report) = tokio::join!(ctx.greeting(), self.report(ctx));

        let view = PageView::new("Reports")
            .with_subtitle(format!(
                "Repository report for {}/{}",
                self.repo.owner, self.repo.repo
            ))
            .with_greeting(greeting)
            .refreshable();

        report.render(view, skeleton, content)
    }

    async fn refresh(&self, ctx: &PlatformContext) {
        ctx.query_client.invalidate(&repo_report_key(&self.repo));
        self.report(ctx).await;
    }
}

fn skeleton(view: PageView) -> PageView {
    view.with_section(Section::loading("Repository", 4))
        .with_section(Section::loading("Languages", 3))
        .with_section(Section::loading("Recent Releases", 5))
}

fn content(view: PageView, report: &RepoReport) -> PageView {
    let repo = &report.repo;
    let mut cards = vec![
        StatCard::new("Stars", format_number(repo.stargazers_count)),
        StatCard::new("Forks", format_number(repo.forks_count)),
        StatCard::new("Open Issues", format_number(repo.open_issues_count)),
        StatCard::new("Watchers", format_number(repo.watchers_count)),
    ];
    if let Some(license) = &repo.license {
        cards.push(StatCard::new("License", license.spdx_id.clone().unwrap_or_else(|| license.name.clone())));
    }

    let rows = report
        .language_percentages
        .iter()
        .map(|l| {
            vec![
                l.name.clone(),
                format_number(l.bytes),
                format!("{:.1}%", l.percentage),
            ]
        })
        .collect();

    let now = Utc::now();
    let releases = report
        .releases
        .iter()
        .map(|r| {
            let mut item = ListItem::new(r.name.clone().unwrap_or_else(|| r.tag_name.clone()))
                .with_link(r.html_url.clone());
            item = match &r.published_at {
                Some(at) => item.with_detail(format!("{} · {}", r.tag_name, time_ago(at, now))),
                None => item.with_detail(r.tag_name.clone()),
            };
            if r.prerelease {
                item = item.with_badge("Pre-release");
            }
            item
        })
        .collect();

    let mut view = view.with_section(Section::new("Repository", SectionBody::Stats { cards }));
    if let Some(description) = &repo.description {
        view = view.with_subtitle(description.clone());
    }
    view.with_section(Section::new(
        "Languages",
        SectionBody::Table {
            columns: vec!["Language".to_string(), "Bytes".to_string(), "Share".to_string()],
            rows,
        },
    ))
    .with_section(Section::new("Recent Releases", SectionBody::List { items: releases }))
}
