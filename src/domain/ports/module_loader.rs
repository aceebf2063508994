//! Remote module port traits.
//!
//! The shell never depends on a concrete remote. It holds a
//! [`ModuleLoader`] per remote and resolves pages through the
//! [`RemoteModule`] the loader yields, whether that module is compiled into
//! this binary or served by another process.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::LoadError;
use crate::domain::models::{ExposedRoute, PageView};
use crate::services::platform::PlatformContext;

/// How a loader obtains its module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderKind {
    /// Module compiled into this binary.
    LocalStatic,
    /// Module fetched from a standalone remote's entry.
    RemoteDynamic { url: String },
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalStatic => f.write_str("local"),
            Self::RemoteDynamic { url } => write!(f, "remote ({url})"),
        }
    }
}

/// A routable page exposed by a remote.
#[async_trait]
pub trait Page: Send + Sync {
    /// Render the page against the shared platform context.
    ///
    /// Rendering never fails: unavailable data becomes loading skeletons or
    /// an inline error banner in the returned view.
    async fn render(&self, ctx: &PlatformContext) -> PageView;

    /// Invalidate the page's queries and refetch them.
    async fn refresh(&self, _ctx: &PlatformContext) {}
}

/// A loaded remote: its routes module and the pages behind it.
pub trait RemoteModule: Send + Sync {
    /// Remote name.
    fn name(&self) -> &str;

    /// Routes exposed by this remote, in declaration order.
    fn routes(&self) -> Vec<ExposedRoute>;

    /// Page for a route id, if the remote provides one.
    fn page(&self, route_id: &str) -> Option<Arc<dyn Page>>;
}

/// Asynchronously yields a remote's module.
///
/// The shell calls `load` at most once per successful load and caches the
/// result; a failed load is retried on the next navigation.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// How this loader obtains the code.
    fn kind(&self) -> LoaderKind;

    /// Load the remote's module.
    async fn load(&self) -> Result<Arc<dyn RemoteModule>, LoadError>;
}
