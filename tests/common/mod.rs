//! Common test utilities for integration tests
//!
//! Fake loaders, modules and account sources shared across test files.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use mfe_shell::domain::errors::{LoadError, QueryError};
use mfe_shell::domain::models::{Account, ExposedRoute, NavMeta, PageView};
use mfe_shell::domain::ports::{AccountSource, LoaderKind, ModuleLoader, Page, RemoteModule};
use mfe_shell::services::{AccountProvider, PlatformContext, QueryClient, RemoteRegistration};

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Account source counting how often it is asked.
pub struct CountingAccountSource {
    pub calls: AtomicUsize,
    pub delay: Duration,
    pub fail: bool,
}

impl CountingAccountSource {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(10),
            fail: true,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountSource for CountingAccountSource {
    async fn fetch_account(&self) -> Result<Account, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(QueryError::Producer("account service down".to_string()));
        }
        Ok(Account {
            id: "user-042".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        })
    }
}

/// Platform context over a fresh cache and the given account source.
pub fn context_with(source: Arc<dyn AccountSource>, render_timeout: Duration) -> PlatformContext {
    let client = QueryClient::default();
    let account = AccountProvider::new(client.clone(), source);
    PlatformContext::new(client, account, render_timeout)
}

pub fn test_context() -> PlatformContext {
    context_with(
        CountingAccountSource::new(Duration::from_millis(10)),
        Duration::from_secs(2),
    )
}

/// Page rendering a fixed title and counting refreshes.
pub struct StaticPage {
    pub title: String,
    pub refreshes: AtomicUsize,
}

#[async_trait]
impl Page for StaticPage {
    async fn render(&self, ctx: &PlatformContext) -> PageView {
        PageView::new(self.title.clone()).with_greeting(ctx.greeting().await)
    }

    async fn refresh(&self, _ctx: &PlatformContext) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Module exposing routes and serving `StaticPage`s for a subset of them.
pub struct StaticModule {
    pub name: String,
    pub routes: Vec<ExposedRoute>,
    pub pages: Vec<(String, Arc<StaticPage>)>,
}

impl StaticModule {
    /// One route `{name}-home` at `/{name}`, with a page titled `{title}`.
    pub fn single(name: &str, title: &str, order: Option<i32>) -> Arc<Self> {
        let id = format!("{name}-home");
        Arc::new(Self {
            name: name.to_string(),
            routes: vec![ExposedRoute::new(
                id.clone(),
                format!("/{name}"),
                Some(NavMeta::new(title, order)),
            )],
            pages: vec![(
                id,
                Arc::new(StaticPage {
                    title: title.to_string(),
                    refreshes: AtomicUsize::new(0),
                }),
            )],
        })
    }

    pub fn page_refreshes(&self, route_id: &str) -> usize {
        self.pages
            .iter()
            .find(|(id, _)| id == route_id)
            .map_or(0, |(_, page)| page.refreshes.load(Ordering::SeqCst))
    }
}

impl RemoteModule for StaticModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn routes(&self) -> Vec<ExposedRoute> {
        self.routes.clone()
    }

    fn page(&self, route_id: &str) -> Option<Arc<dyn Page>> {
        self.pages
            .iter()
            .find(|(id, _)| id == route_id)
            .map(|(_, page)| Arc::clone(page) as Arc<dyn Page>)
    }
}

/// Loader yielding a module after a delay, counting loads.
pub struct FakeLoader {
    pub module: Option<Arc<StaticModule>>,
    pub delay: Duration,
    pub loads: AtomicUsize,
}

impl FakeLoader {
    pub fn ok(module: Arc<StaticModule>) -> Arc<Self> {
        Self::delayed(module, Duration::ZERO)
    }

    pub fn delayed(module: Arc<StaticModule>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            module: Some(module),
            delay,
            loads: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::failing_after(Duration::ZERO)
    }

    pub fn failing_after(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            module: None,
            delay,
            loads: AtomicUsize::new(0),
        })
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModuleLoader for FakeLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::LocalStatic
    }

    async fn load(&self) -> Result<Arc<dyn RemoteModule>, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.module {
            Some(module) => Ok(Arc::clone(module) as Arc<dyn RemoteModule>),
            None => Err(LoadError::Fetch {
                url: "http://localhost:1/remoteEntry.json".to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// Registration using the routes the module declares.
pub fn registration(module: &Arc<StaticModule>, loader: Arc<FakeLoader>) -> RemoteRegistration {
    RemoteRegistration::new(module.name.clone(), loader, module.routes.clone())
}

/// Base URL of a server that accepts connections and never answers.
///
/// Accepted sockets are held open until the runtime shuts down.
pub async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}
