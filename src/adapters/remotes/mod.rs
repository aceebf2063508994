//! Domain remotes and their registration.
//!
//! Each remote exposes one page backed by GitHub data. A remote configured
//! as `local` is compiled into the shell; one configured as `remote` is
//! served by its own `mfe-shell remote <name>` process and reached through
//! its entry URL.

pub mod admin;
pub mod reports;
pub mod traffic;

use std::future::Future;
use std::sync::Arc;

use crate::adapters::github::GitHubClient;
use crate::adapters::loaders::{LocalStaticLoader, RemoteDynamicLoader};
use crate::domain::errors::{QueryError, RegistryError};
use crate::domain::models::config::{Config, RemoteMode, RouteConfig};
use crate::domain::models::{ExposedRoute, NavMeta, PageView, QueryKey, QueryOptions};
use crate::domain::ports::{ModuleLoader, RemoteModule};
use crate::services::platform::PlatformContext;
use crate::services::remote_registry::RemoteRegistration;

pub use admin::AdminRemote;
pub use reports::ReportsRemote;
pub use traffic::TrafficRemote;

/// Remotes shipped with the shell, in registration order.
pub const BUILTIN_REMOTES: [&str; 3] = [traffic::REMOTE_NAME, reports::REMOTE_NAME, admin::REMOTE_NAME];

/// Outcome of a page query bounded by the render timeout.
pub(crate) enum Resolved<T> {
    Ready(Arc<T>),
    /// Still fetching with nothing cached yet.
    Loading,
    /// Last fetch failed; `stale` holds any earlier value.
    Failed {
        error: QueryError,
        stale: Option<Arc<T>>,
    },
}

impl<T> Resolved<T> {
    /// Fill `view` with a skeleton, the content, or an error banner.
    pub(crate) fn render(
        self,
        view: PageView,
        skeleton: impl FnOnce(PageView) -> PageView,
        content: impl FnOnce(PageView, &T) -> PageView,
    ) -> PageView {
        match self {
            Self::Ready(value) => content(view, &value),
            Self::Loading => skeleton(view),
            Self::Failed { error, stale } => {
                let view = view.with_error(error.to_string());
                match stale {
                    Some(value) => content(view, &value),
                    None => view,
                }
            }
        }
    }
}

/// Fetch through the shared cache, waiting at most the render timeout.
///
/// A fetch that outlives the timeout keeps running and fills the cache for
/// the next render; meanwhile any stale value is shown.
pub(crate) async fn resolve<T, F, Fut>(
    ctx: &PlatformContext,
    key: QueryKey,
    options: QueryOptions,
    producer: F,
) -> Resolved<T>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
{
    let client = &ctx.query_client;
    let fetch = client.fetch_with(key.clone(), options, producer);
    match tokio::time::timeout(ctx.render_timeout, fetch).await {
        Ok(Ok(value)) => Resolved::Ready(value),
        Ok(Err(error)) => Resolved::Failed {
            stale: client.get_data(&key),
            error,
        },
        Err(_) => {
            tracing::debug!(key = %key, "query still pending at render timeout");
            client.get_data(&key).map_or(Resolved::Loading, Resolved::Ready)
        }
    }
}

/// Build the compiled-in module for a built-in remote.
pub fn builtin_module(name: &str, config: &Config, github: &GitHubClient) -> Option<Arc<dyn RemoteModule>> {
    let gh = &config.github;
    match name {
        traffic::REMOTE_NAME => Some(Arc::new(TrafficRemote::new(github.clone(), gh.traffic_repo.clone()))),
        reports::REMOTE_NAME => Some(Arc::new(ReportsRemote::new(github.clone(), gh.reports_repo.clone()))),
        admin::REMOTE_NAME => Some(Arc::new(AdminRemote::new(github.clone(), gh.admin_repo.clone()))),
        _ => None,
    }
}

/// Route metadata a built-in remote exposes, known without loading it.
pub fn builtin_routes(name: &str) -> Option<Vec<ExposedRoute>> {
    match name {
        traffic::REMOTE_NAME => Some(traffic::routes()),
        reports::REMOTE_NAME => Some(reports::routes()),
        admin::REMOTE_NAME => Some(admin::routes()),
        _ => None,
    }
}

fn configured_routes(routes: &[RouteConfig]) -> Vec<ExposedRoute> {
    routes
        .iter()
        .map(|r| {
            ExposedRoute::new(
                r.id.clone(),
                r.path.clone(),
                r.label.clone().map(|label| NavMeta::new(label, r.order)),
            )
        })
        .collect()
}

/// Registration messages for every configured remote.
///
/// Built-in remotes come first in their fixed order, then any additional
/// remote in name order. Additional remotes must be `remote` mode and
/// declare their routes.
pub fn registrations(config: &Config, github: &GitHubClient) -> Result<Vec<RemoteRegistration>, RegistryError> {
    let mut names: Vec<&str> = BUILTIN_REMOTES
        .iter()
        .copied()
        .filter(|name| config.remotes.contains_key(*name))
        .collect();
    names.extend(
        config
            .remotes
            .keys()
            .map(String::as_str)
            .filter(|name| !BUILTIN_REMOTES.contains(name)),
    );

    let mut registrations = Vec::with_capacity(names.len());
    for name in names {
        let Some(remote) = config.remote(name) else {
            continue;
        };

        let routes = if remote.routes.is_empty() {
            builtin_routes(name).ok_or_else(|| RegistryError::InvalidRegistration {
                name: name.to_string(),
                reason: "additional remotes must declare their routes".to_string(),
            })?
        } else {
            configured_routes(&remote.routes)
        };

        let loader: Arc<dyn ModuleLoader> = match remote.mode {
            RemoteMode::Remote => Arc::new(
                RemoteDynamicLoader::new(name, remote.url.clone()).with_timeout(config.cache.request_timeout()),
            ),
            RemoteMode::Local => {
                let module = builtin_module(name, config, github).ok_or_else(|| {
                    RegistryError::InvalidRegistration {
                        name: name.to_string(),
                        reason: "only built-in remotes can run in local mode".to_string(),
                    }
                })?;
                let owned = name.to_string();
                Arc::new(LocalStaticLoader::new(owned, move || Arc::clone(&module)))
            }
        };

        registrations.push(RemoteRegistration::new(name, loader, routes));
    }
    Ok(registrations)
}
