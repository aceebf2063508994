//! Loader for remotes compiled into this binary.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::LoadError;
use crate::domain::ports::{LoaderKind, ModuleLoader, RemoteModule};

type ModuleFactory = dyn Fn() -> Arc<dyn RemoteModule> + Send + Sync;

/// Loader for a remote compiled into this binary.
///
/// The module is built by `factory` on first load, not at registration.
pub struct LocalStaticLoader {
    name: String,
    factory: Arc<ModuleFactory>,
}

impl LocalStaticLoader {
    /// Loader building `name` with `factory`.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn RemoteModule> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }
}

impl fmt::Debug for LocalStaticLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStaticLoader")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModuleLoader for LocalStaticLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::LocalStatic
    }

    async fn load(&self) -> Result<Arc<dyn RemoteModule>, LoadError> {
        tracing::debug!(remote = %self.name, "instantiating local remote");
        Ok((self.factory)())
    }
}
