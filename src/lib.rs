//! mfe-shell - Micro-frontend shell
//!
//! A host application that composes independently deployed domain remotes
//! (traffic, reports, admin) into one navigable site. Remotes share a single
//! query cache with single-flight fetching and a shared account provider.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, ports and error types
//! - **Service Layer** (`services`): query cache, account provider, remote registry
//! - **Application Layer** (`application`): the shell state machine and layout
//! - **Adapters** (`adapters`): GitHub client, module loaders, domain remotes, HTTP servers
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use mfe_shell::application::build_shell;
//! use mfe_shell::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let shell = build_shell(&Config::default())?;
//!     shell.start();
//!     shell.wait_ready().await;
//!     let page = shell.navigate("/traffic").await;
//!     println!("{}", shell.render_document(&page)?);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{Navigation, RouteOutcome, ShellApp, ShellState};
pub use domain::errors::{DomainError, DomainResult, LoadError, QueryError, RegistryError};
pub use domain::models::{Config, PageView, QueryKey, QueryOptions};
pub use domain::ports::{ModuleLoader, Page, RemoteModule};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AccountProvider, PlatformContext, QueryClient, RemoteRegistry};
