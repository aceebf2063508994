//! Domain errors for the micro-frontend shell.

use thiserror::Error;

/// Errors produced by a cached query.
///
/// Cloneable because a single in-flight fetch hands the same outcome to
/// every caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Upstream answered with a non-success status.
    #[error("GitHub API error: {status}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Request path.
        endpoint: String,
    },

    /// The request never produced a response (connect failure, timeout).
    #[error("Request to {endpoint} failed: {reason}")]
    Transport {
        /// Request path.
        endpoint: String,
        /// Underlying client error.
        reason: String,
    },

    /// The response body did not match the expected shape.
    #[error("Failed to decode response from {endpoint}: {reason}")]
    Decode {
        /// Request path.
        endpoint: String,
        /// Decoder error.
        reason: String,
    },

    /// The hourly request budget is spent.
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited {
        /// Seconds until the budget refills.
        retry_after_secs: u64,
    },

    /// The cached value was stored with another type.
    #[error("Cached value for {key} has a different type")]
    TypeMismatch {
        /// Query key, rendered.
        key: String,
    },

    /// The task running the producer panicked or was cancelled.
    #[error("Query {key} aborted: {reason}")]
    Aborted {
        /// Query key, rendered.
        key: String,
        /// Join error.
        reason: String,
    },

    /// Any other producer failure.
    #[error("{0}")]
    Producer(String),
}

impl QueryError {
    /// HTTP status code carried by the error, if any.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while loading a remote's code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The entry could not be requested.
    #[error("Failed to fetch remote entry {url}: {reason}")]
    Fetch {
        /// Entry URL.
        url: String,
        /// Underlying client error.
        reason: String,
    },

    /// The entry request returned a non-success status.
    #[error("Remote entry {url} returned {status}")]
    Status {
        /// Entry URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The entry is malformed or names another remote.
    #[error("Invalid remote entry from {url}: {reason}")]
    InvalidManifest {
        /// Entry URL.
        url: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No loader is registered for the remote.
    #[error("Remote '{0}' is unavailable")]
    Unavailable(String),

    /// The load task panicked or was cancelled.
    #[error("Loading remote '{remote}' aborted: {reason}")]
    Aborted {
        /// Remote name.
        remote: String,
        /// Join error.
        reason: String,
    },
}

/// Errors raised by the remote registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Another remote already exposes the route id.
    #[error("Route id '{id}' is already registered by remote '{owner}'")]
    DuplicateRouteId {
        /// Conflicting route id.
        id: String,
        /// Remote holding it.
        owner: String,
    },

    /// Another remote already serves the path.
    #[error("Route path '{path}' is already registered by remote '{owner}'")]
    DuplicatePath {
        /// Conflicting path.
        path: String,
        /// Remote holding it.
        owner: String,
    },

    /// The registration itself is unusable.
    #[error("Invalid remote registration '{name}': {reason}")]
    InvalidRegistration {
        /// Remote name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Umbrella error for shell operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A cached query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A remote failed to load.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A registration was rejected.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// No remote with this name exists.
    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    /// No route with this id or path exists.
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// A layout template failed to compile or render.
    #[error("Template error: {0}")]
    Template(String),

    /// A value could not be serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result alias for shell operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<minijinja::Error> for DomainError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}
