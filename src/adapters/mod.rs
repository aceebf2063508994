//! Adapters for external systems and the concrete remotes.

pub mod github;
pub mod http;
pub mod loaders;
pub mod remotes;
