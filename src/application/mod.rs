//! Application layer: the shell that composes remotes into documents.

pub mod bootstrap;
pub mod layout;
pub mod shell;

pub use bootstrap::{build_registry, build_shell, platform_context, standalone_remote};
pub use layout::Layout;
pub use shell::{normalize_path, Navigation, RemoteStatus, RouteOutcome, ShellApp, ShellState};
