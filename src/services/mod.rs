//! Service layer: the shared platform services and the remote registry.

pub mod account_provider;
pub mod platform;
pub mod query_client;
pub mod remote_registry;

pub use account_provider::{account_query_key, AccountProvider, SimulatedAccountSource};
pub use platform::PlatformContext;
pub use query_client::{QueryClient, DEFAULT_STALE_TIME};
pub use remote_registry::{RemoteRegistration, RemoteRegistry};
