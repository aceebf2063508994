//! Domain models shared across layers.

pub mod account;
pub mod config;
pub mod page;
pub mod query;
pub mod remote_entry;
pub mod route;

pub use account::Account;
pub use config::{
    AccountConfig, CacheConfig, Config, GitHubConfig, LoggingConfig, RemoteConfig, RemoteMode,
    RepoRef, RouteConfig, ServerConfig,
};
pub use page::{Greeting, ListItem, PageView, Section, SectionBody, StatCard};
pub use query::{KeySegment, QueryKey, QueryOptions, QuerySnapshot, QueryStatus};
pub use remote_entry::{RemoteEntryManifest, RemoteEntryRoute, REMOTE_ENTRY_PATH};
pub use route::{is_active_path, ExposedRoute, NavItem, NavMeta, RouteDescriptor};
