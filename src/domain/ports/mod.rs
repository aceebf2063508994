//! Port trait definitions (Hexagonal Architecture)
//!
//! - ModuleLoader / RemoteModule / Page: how the shell reaches remote code
//! - AccountSource: where the signed-in account comes from

pub mod account_source;
pub mod module_loader;

pub use account_source::AccountSource;
pub use module_loader::{LoaderKind, ModuleLoader, Page, RemoteModule};
