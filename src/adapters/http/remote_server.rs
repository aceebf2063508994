//! Standalone remote HTTP server.
//!
//! Publishes a remote's entry and renders its pages as JSON fragments for
//! a shell running the remote in `remote` mode.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};

use crate::domain::models::{PageView, RemoteEntryManifest, REMOTE_ENTRY_PATH};
use crate::domain::ports::RemoteModule;
use crate::services::platform::PlatformContext;

use super::{error_response, health_check, serve_router, with_layers, ErrorResponse, HttpConfig};

struct AppState {
    module: Arc<dyn RemoteModule>,
    ctx: PlatformContext,
}

/// HTTP server exposing one remote's entry and fragments.
pub struct RemoteServer {
    config: HttpConfig,
    module: Arc<dyn RemoteModule>,
    ctx: PlatformContext,
}

impl RemoteServer {
    /// Server for `module`, rendering against `ctx`.
    pub fn new(module: Arc<dyn RemoteModule>, ctx: PlatformContext, config: HttpConfig) -> Self {
        Self {
            config,
            module,
            ctx,
        }
    }

    /// Build the router.
    pub fn build_router(&self) -> Router {
        let state = Arc::new(AppState {
            module: Arc::clone(&self.module),
            ctx: self.ctx.clone(),
        });

        let app = Router::new()
            .route(REMOTE_ENTRY_PATH, get(remote_entry))
            .route("/fragments/{route_id}", get(render_fragment))
            .route("/fragments/{route_id}/refresh", post(refresh_fragment))
            .route("/health", get(health_check))
            .with_state(state);

        with_layers(app, &self.config)
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let name = format!("Remote '{}'", self.module.name());
        serve_router(&name, &self.config, router, shutdown).await
    }
}

// Handler functions

async fn remote_entry(State(state): State<Arc<AppState>>) -> Json<RemoteEntryManifest> {
    Json(RemoteEntryManifest::from_routes(
        state.module.name(),
        &state.module.routes(),
    ))
}

async fn render_fragment(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<String>,
) -> Result<Json<PageView>, (StatusCode, Json<ErrorResponse>)> {
    let page = state.module.page(&route_id).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Route {route_id} not found"),
        )
    })?;
    Ok(Json(page.render(&state.ctx).await))
}

async fn refresh_fragment(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let page = state.module.page(&route_id).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Route {route_id} not found"),
        )
    })?;
    page.refresh(&state.ctx).await;
    Ok(StatusCode::NO_CONTENT)
}
