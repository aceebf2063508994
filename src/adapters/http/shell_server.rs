//! Shell HTTP server.
//!
//! Serves composed HTML documents for every registered path, plus a small
//! JSON API over the registry and the shared cache.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::application::shell::{RemoteStatus, RouteOutcome, ShellApp, ShellState};
use crate::domain::errors::DomainResult;
use crate::domain::models::{NavItem, NavMeta, QueryKey, QuerySnapshot};
use crate::services::remote_registry::RemoteRegistry;

use super::{error_response, health_check, serve_router, with_layers, ErrorResponse, HttpConfig};

/// Route listing entry with the owning remote's load state.
#[derive(Debug, Serialize)]
pub struct RouteInfo {
    /// Route id.
    pub id: String,
    /// Path the route is served at.
    pub path: String,
    /// Owning remote.
    pub remote: String,
    /// Sidebar entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav: Option<NavMeta>,
    /// Load state of the owning remote.
    pub remote_status: RemoteStatus,
}

/// Query of `POST /api/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    /// Path of the page to refresh.
    pub path: String,
}

/// Body of `POST /api/cache/invalidate`.
#[derive(Debug, Default, Deserialize)]
pub struct InvalidateRequest {
    /// Key to invalidate; every entry when absent.
    #[serde(default)]
    pub key: Option<QueryKey>,
    /// Treat `key` as a prefix.
    #[serde(default)]
    pub prefix: bool,
}

/// Reply of `POST /api/cache/invalidate`.
#[derive(Debug, Serialize, Deserialize)]
pub struct InvalidateResponse {
    /// Number of entries marked stale.
    pub invalidated: usize,
}

/// HTTP front of a [`ShellApp`].
pub struct ShellServer {
    config: HttpConfig,
    shell: Arc<ShellApp>,
}

impl ShellServer {
    /// Server for `shell` with `config`.
    pub const fn new(shell: Arc<ShellApp>, config: HttpConfig) -> Self {
        Self { config, shell }
    }

    /// Build the router.
    pub fn build_router(&self) -> Router {
        let app = Router::new()
            // Registry and cache API
            .route("/api/routes", get(list_routes))
            .route("/api/nav", get(list_nav))
            .route("/api/cache", get(cache_snapshot))
            .route("/api/cache/invalidate", post(invalidate_cache))
            .route("/api/refresh", post(refresh_page))
            // Health check
            .route("/health", get(health_check))
            // Documents
            .route("/", get(render_page))
            .fallback(render_page)
            .with_state(Arc::clone(&self.shell));

        with_layers(app, &self.config)
    }

    /// Serve until the process exits.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves, then drain open connections.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        serve_router("Shell server", &self.config, router, shutdown).await
    }
}

// Handler functions

const fn status_for(outcome: &RouteOutcome) -> StatusCode {
    match outcome {
        RouteOutcome::Home | RouteOutcome::Page { .. } | RouteOutcome::Loading { .. } => StatusCode::OK,
        RouteOutcome::FailedToLoad { .. } => StatusCode::BAD_GATEWAY,
        RouteOutcome::RouteMissing { .. } | RouteOutcome::NotFound { .. } => StatusCode::NOT_FOUND,
    }
}

fn html(status: StatusCode, document: DomainResult<String>) -> Response {
    match document {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render document");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ERROR", e.to_string()).into_response()
        }
    }
}

async fn render_page(State(shell): State<Arc<ShellApp>>, uri: Uri) -> Response {
    if shell.state() == ShellState::Bootstrapping {
        return html(StatusCode::SERVICE_UNAVAILABLE, shell.render_bootstrapping());
    }
    let navigation = shell.navigate(uri.path()).await;
    html(status_for(&navigation.outcome), shell.render_document(&navigation))
}

async fn refresh_page(
    State(shell): State<Arc<ShellApp>>,
    Query(params): Query<RefreshParams>,
) -> Redirect {
    let navigation = shell.refresh(&params.path).await;
    Redirect::to(redirect_target(shell.registry(), &navigation.path))
}

/// Local path to send the browser back to after a refresh.
///
/// Only registered route paths are echoed; anything else, including
/// protocol-relative `//host` paths, goes home.
fn redirect_target<'a>(registry: &'a RemoteRegistry, path: &str) -> &'a str {
    registry
        .route_by_path(path)
        .map(|route| route.path.as_str())
        .filter(|target| target.starts_with('/') && !target.starts_with("//"))
        .unwrap_or("/")
}

async fn list_routes(State(shell): State<Arc<ShellApp>>) -> Json<Vec<RouteInfo>> {
    let routes = shell
        .registry()
        .all_routes()
        .into_iter()
        .map(|r| RouteInfo {
            remote_status: shell.remote_status(&r.remote),
            id: r.id,
            path: r.path,
            remote: r.remote,
            nav: r.nav,
        })
        .collect();
    Json(routes)
}

async fn list_nav(State(shell): State<Arc<ShellApp>>) -> Json<Vec<NavItem>> {
    Json(shell.nav_items())
}

async fn cache_snapshot(State(shell): State<Arc<ShellApp>>) -> Json<Vec<QuerySnapshot>> {
    Json(shell.context().query_client.snapshot())
}

async fn invalidate_cache(
    State(shell): State<Arc<ShellApp>>,
    body: Option<Json<InvalidateRequest>>,
) -> Result<Json<InvalidateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let client = &shell.context().query_client;

    let invalidated = match (&request.key, request.prefix) {
        (None, _) => client.invalidate_all(),
        (Some(key), true) => client.invalidate_matching(key),
        (Some(key), false) => {
            if !client.invalidate(key) {
                return Err(error_response(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Query {key} not found"),
                ));
            }
            1
        }
    };
    Ok(Json(InvalidateResponse { invalidated }))
}
