//! Loader for remotes served by their own process.
//!
//! The loader reads the remote's well-known entry, checks it, and yields a
//! module whose pages are fetched as JSON fragments from the remote.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::errors::LoadError;
use crate::domain::models::{ExposedRoute, PageView, RemoteEntryManifest, RemoteEntryRoute, REMOTE_ENTRY_PATH};
use crate::domain::ports::{LoaderKind, ModuleLoader, Page, RemoteModule};
use crate::services::platform::PlatformContext;

/// Upper bound on any single request to a remote.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Fetches a remote's entry over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteDynamicLoader {
    name: String,
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl RemoteDynamicLoader {
    /// Loader for the remote `name` served at `base_url`.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_client(name, base_url, Client::new())
    }

    /// Loader sharing an existing HTTP client.
    pub fn with_client(name: impl Into<String>, base_url: impl Into<String>, http: Client) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound every request to the remote, entry and fragments alike.
    ///
    /// A remote that accepts the connection but never answers fails its
    /// load after `timeout`, so the shell can report it and retry later.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the remote's entry manifest.
    pub fn entry_url(&self) -> String {
        format!("{}{}", self.base_url, REMOTE_ENTRY_PATH)
    }
}

#[async_trait]
impl ModuleLoader for RemoteDynamicLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::RemoteDynamic {
            url: self.base_url.clone(),
        }
    }

    async fn load(&self) -> Result<Arc<dyn RemoteModule>, LoadError> {
        let url = self.entry_url();
        tracing::info!(remote = %self.name, url = %url, "Fetching remote entry");

        let resp = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| LoadError::Fetch {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(LoadError::Status {
                url,
                status: resp.status().as_u16(),
            });
        }

        let manifest: RemoteEntryManifest =
            resp.json().await.map_err(|e| LoadError::InvalidManifest {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        manifest
            .validate()
            .map_err(|reason| LoadError::InvalidManifest {
                url: url.clone(),
                reason,
            })?;

        if manifest.name != self.name {
            return Err(LoadError::InvalidManifest {
                url,
                reason: format!("expected remote '{}', found '{}'", self.name, manifest.name),
            });
        }

        Ok(Arc::new(HttpRemoteModule {
            name: manifest.name,
            base_url: self.base_url.clone(),
            routes: manifest.routes,
            http: self.http.clone(),
            timeout: self.timeout,
        }))
    }
}

/// Module backed by a standalone remote.
#[derive(Debug)]
pub struct HttpRemoteModule {
    name: String,
    base_url: String,
    routes: Vec<RemoteEntryRoute>,
    http: Client,
    timeout: Duration,
}

impl RemoteModule for HttpRemoteModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn routes(&self) -> Vec<ExposedRoute> {
        self.routes.iter().map(RemoteEntryRoute::exposed).collect()
    }

    fn page(&self, route_id: &str) -> Option<Arc<dyn Page>> {
        let route = self.routes.iter().find(|r| r.id == route_id)?;
        Some(Arc::new(HttpPage {
            route_id: route.id.clone(),
            fragment_url: format!("{}{}", self.base_url, route.fragment),
            http: self.http.clone(),
            timeout: self.timeout,
        }))
    }
}

/// Page rendered by a standalone remote.
///
/// The greeting is replaced with the shell's own, so every page shows the
/// account the shell holds.
#[derive(Debug)]
struct HttpPage {
    route_id: String,
    fragment_url: String,
    http: Client,
    timeout: Duration,
}

impl HttpPage {
    async fn fetch_view(&self) -> Result<PageView, String> {
        let resp = self
            .http
            .get(&self.fragment_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| format!("Failed to reach remote: {e}"))?;
        if !resp.status().is_success() {
            return Err(format!("Remote returned {}", resp.status().as_u16()));
        }
        resp.json::<PageView>()
            .await
            .map_err(|e| format!("Invalid page from remote: {e}"))
    }
}

#[async_trait]
impl Page for HttpPage {
    async fn render(&self, ctx: &PlatformContext) -> PageView {
        let (view, greeting) = tokio::join!(self.fetch_view(), ctx.greeting());
        match view {
            Ok(view) => view.with_greeting(greeting),
            Err(message) => {
                tracing::warn!(route = %self.route_id, url = %self.fragment_url, error = %message, "fragment fetch failed");
                PageView::new(self.route_id.clone())
                    .with_greeting(greeting)
                    .with_error(message)
            }
        }
    }

    async fn refresh(&self, _ctx: &PlatformContext) {
        let url = format!("{}/refresh", self.fragment_url);
        match self.http.post(&url).timeout(self.timeout).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                tracing::warn!(url = %url, status = resp.status().as_u16(), "remote refresh rejected");
            }
            Err(err) => tracing::warn!(url = %url, error = %err, "remote refresh failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_url_trims_trailing_slash() {
        let loader = RemoteDynamicLoader::new("traffic", "http://localhost:3002/");
        assert_eq!(loader.entry_url(), "http://localhost:3002/remoteEntry.json");
        assert_eq!(
            loader.kind(),
            LoaderKind::RemoteDynamic {
                url: "http://localhost:3002".to_string()
            }
        );
    }
}
