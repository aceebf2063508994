//! The shell application.
//!
//! [`ShellApp`] owns the registry, the platform context and the cache of
//! loaded remote modules. It bootstraps the platform (account warm-up), then
//! resolves navigations: route lookup, lazy remote load, page render. A
//! failing remote only ever affects its own route.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::errors::{DomainResult, LoadError};
use crate::domain::models::{NavItem, PageView};
use crate::domain::ports::{ModuleLoader, RemoteModule};
use crate::services::platform::PlatformContext;
use crate::services::remote_registry::RemoteRegistry;

use super::layout::Layout;

/// Lifecycle of the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellState {
    /// Platform warm-up running; a loading document is served.
    Bootstrapping,
    /// Serving pages.
    Ready,
}

/// Load state of one remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    /// No load attempted, or the last one failed.
    NotLoaded,
    /// A load is in progress.
    Loading,
    /// Module available.
    Loaded,
}

/// What a navigation resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteOutcome {
    /// The landing page.
    Home,
    /// A rendered page.
    Page {
        /// Route that rendered.
        route_id: String,
        /// Rendered content.
        view: PageView,
    },
    /// The remote did not load within the load timeout; loading continues.
    Loading {
        /// Route waiting for its remote.
        route_id: String,
    },
    /// The remote's code could not be loaded.
    FailedToLoad {
        /// Remote that failed.
        remote: String,
        /// Load error, rendered.
        reason: String,
    },
    /// The remote loaded but does not provide the route.
    RouteMissing {
        /// Route the remote lacks.
        route_id: String,
    },
    /// No route is registered at the path.
    NotFound {
        /// Normalized path.
        path: String,
    },
}

/// Result of navigating to a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// Normalized path.
    pub path: String,
    /// What the path resolved to.
    pub outcome: RouteOutcome,
}

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<dyn RemoteModule>, LoadError>>>;

enum Slot {
    /// A load in progress, tagged with its load id.
    Loading(u64, SharedLoad),
    Loaded(Arc<dyn RemoteModule>),
}

impl Slot {
    fn is_load(&self, load_id: u64) -> bool {
        matches!(self, Self::Loading(id, _) if *id == load_id)
    }
}

type ModuleCache = Arc<Mutex<HashMap<String, Slot>>>;

fn lock(cache: &Mutex<HashMap<String, Slot>>) -> MutexGuard<'_, HashMap<String, Slot>> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Host application composing the registered remotes.
pub struct ShellApp {
    registry: Arc<RemoteRegistry>,
    ctx: PlatformContext,
    load_timeout: Duration,
    layout: Layout,
    state: Arc<watch::Sender<ShellState>>,
    modules: ModuleCache,
    next_load_id: AtomicU64,
}

impl std::fmt::Debug for ShellApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loaded: Vec<String> = lock(&self.modules).keys().cloned().collect();
        f.debug_struct("ShellApp")
            .field("state", &self.state())
            .field("registry", &self.registry)
            .field("modules", &loaded)
            .finish_non_exhaustive()
    }
}

impl ShellApp {
    /// Shell over `registry`, waiting at most `load_timeout` for a remote.
    pub fn new(registry: RemoteRegistry, ctx: PlatformContext, load_timeout: Duration) -> DomainResult<Self> {
        let (state, _) = watch::channel(ShellState::Bootstrapping);
        Ok(Self {
            registry: Arc::new(registry),
            ctx,
            load_timeout,
            layout: Layout::new()?,
            state: Arc::new(state),
            modules: Arc::new(Mutex::new(HashMap::new())),
            next_load_id: AtomicU64::new(1),
        })
    }

    /// Begin bootstrapping: warm the account, then become ready.
    ///
    /// A failed warm-up is logged and the shell becomes ready anyway; pages
    /// surface the missing account themselves.
    pub fn start(&self) -> JoinHandle<()> {
        let ctx = self.ctx.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tracing::info!("Bootstrapping shell");
            ctx.account.prefetch().await;
            match ctx.account.cached() {
                Some(account) => tracing::info!(account = %account.id, "Platform ready"),
                None => tracing::warn!("Account warm-up failed, continuing"),
            }
            state.send_replace(ShellState::Ready);
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ShellState {
        *self.state.borrow()
    }

    /// Wait until bootstrapping has finished.
    pub async fn wait_ready(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this only returns once ready.
        let _ = rx.wait_for(|s| *s == ShellState::Ready).await;
    }

    /// Shared platform context.
    pub fn context(&self) -> &PlatformContext {
        &self.ctx
    }

    /// Registered remotes and routes.
    pub fn registry(&self) -> &RemoteRegistry {
        &self.registry
    }

    /// Sidebar entries in display order.
    pub fn nav_items(&self) -> Vec<NavItem> {
        self.registry.nav_items()
    }

    /// Load state of `remote`.
    pub fn remote_status(&self, remote: &str) -> RemoteStatus {
        match lock(&self.modules).get(remote) {
            None => RemoteStatus::NotLoaded,
            Some(Slot::Loading(..)) => RemoteStatus::Loading,
            Some(Slot::Loaded(_)) => RemoteStatus::Loaded,
        }
    }

    /// Load a remote's module, sharing a load already in progress.
    ///
    /// Successful loads are kept; a failed load is forgotten so the next
    /// navigation tries again.
    pub async fn load_remote(&self, remote: &str) -> Result<Arc<dyn RemoteModule>, LoadError> {
        let load = {
            let mut modules = lock(&self.modules);
            match modules.get(remote) {
                Some(Slot::Loaded(module)) => return Ok(Arc::clone(module)),
                Some(Slot::Loading(_, load)) => load.clone(),
                None => {
                    let loader = self
                        .registry
                        .loader_for(remote)
                        .ok_or_else(|| LoadError::Unavailable(remote.to_string()))?;
                    let load_id = self.next_load_id.fetch_add(1, Ordering::Relaxed);
                    let load = spawn_load(Arc::clone(&self.modules), remote.to_string(), load_id, loader);
                    modules.insert(remote.to_string(), Slot::Loading(load_id, load.clone()));
                    load
                }
            }
        };
        load.await
    }

    /// Resolve `path` to a rendered page or a placeholder.
    pub async fn navigate(&self, path: &str) -> Navigation {
        let path = normalize_path(path);
        let outcome = self.resolve(&path).await;
        Navigation { path, outcome }
    }

    async fn resolve(&self, path: &str) -> RouteOutcome {
        if path == "/" {
            return RouteOutcome::Home;
        }
        let Some(route) = self.registry.route_by_path(path) else {
            tracing::debug!(path, "no route registered");
            return RouteOutcome::NotFound {
                path: path.to_string(),
            };
        };

        let module = match tokio::time::timeout(self.load_timeout, self.load_remote(&route.remote)).await {
            Ok(Ok(module)) => module,
            Ok(Err(err)) => {
                tracing::warn!(remote = %route.remote, route = %route.id, error = %err, "Remote failed to load");
                return RouteOutcome::FailedToLoad {
                    remote: route.remote.clone(),
                    reason: err.to_string(),
                };
            }
            Err(_) => {
                tracing::info!(remote = %route.remote, route = %route.id, "Remote still loading");
                return RouteOutcome::Loading {
                    route_id: route.id.clone(),
                };
            }
        };

        let Some(page) = module.page(&route.id) else {
            tracing::warn!(remote = %route.remote, route = %route.id, "Remote does not provide route");
            return RouteOutcome::RouteMissing {
                route_id: route.id.clone(),
            };
        };

        let view = page.render(&self.ctx).await;
        RouteOutcome::Page {
            route_id: route.id.clone(),
            view,
        }
    }

    /// Run the page's refresh action, then navigate to it again.
    pub async fn refresh(&self, path: &str) -> Navigation {
        let normalized = normalize_path(path);
        if let Some(route) = self.registry.route_by_path(&normalized) {
            if let Ok(Ok(module)) =
                tokio::time::timeout(self.load_timeout, self.load_remote(&route.remote)).await
            {
                if let Some(page) = module.page(&route.id) {
                    tracing::info!(route = %route.id, "Refreshing page");
                    page.refresh(&self.ctx).await;
                }
            }
        }
        self.navigate(&normalized).await
    }

    /// Full HTML document for a navigation.
    pub fn render_document(&self, navigation: &Navigation) -> DomainResult<String> {
        let account = self.ctx.account.cached();
        self.layout
            .render(navigation, &self.registry.nav_items(), account.as_deref())
    }

    /// Document served while bootstrapping.
    pub fn render_bootstrapping(&self) -> DomainResult<String> {
        self.layout.render_bootstrapping()
    }

    /// Drop loaded modules and clear the shared cache.
    pub fn shutdown(&self) {
        lock(&self.modules).clear();
        self.ctx.query_client.clear();
        tracing::info!("Shell shut down");
    }
}

/// Run `loader` on its own task and settle the slot tagged `load_id`.
///
/// A load whose slot was cleared or replaced meanwhile still answers its
/// callers but leaves the cache alone.
fn spawn_load(modules: ModuleCache, remote: String, load_id: u64, loader: Arc<dyn ModuleLoader>) -> SharedLoad {
    let task_remote = remote.clone();
    let task = tokio::spawn(async move {
        tracing::info!(remote = %task_remote, loader = %loader.kind(), load_id, "Loading remote");
        let result = loader.load().await;
        let mut cache = lock(&modules);
        let current = cache.get(&task_remote).is_some_and(|slot| slot.is_load(load_id));
        match &result {
            Ok(module) => {
                if current {
                    cache.insert(task_remote.clone(), Slot::Loaded(Arc::clone(module)));
                }
                tracing::info!(remote = %task_remote, load_id, current, "Remote loaded");
            }
            Err(err) => {
                if current {
                    cache.remove(&task_remote);
                }
                tracing::warn!(remote = %task_remote, load_id, error = %err, "Remote load failed");
            }
        }
        result
    });

    async move {
        task.await.unwrap_or_else(|join_err| {
            Err(LoadError::Aborted {
                remote,
                reason: join_err.to_string(),
            })
        })
    }
    .boxed()
    .shared()
}

/// Strip the query string and any trailing slash.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
