//! Module loaders: compiled-in remotes and remotes served over HTTP.

pub mod local_static;
pub mod remote_dynamic;

pub use local_static::LocalStaticLoader;
pub use remote_dynamic::{HttpRemoteModule, RemoteDynamicLoader};
