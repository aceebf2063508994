//! Composition root: wires configuration into a ready-to-start shell.

use std::sync::Arc;

use crate::adapters::github::GitHubClient;
use crate::adapters::remotes;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::config::Config;
use crate::domain::ports::RemoteModule;
use crate::services::account_provider::{AccountProvider, SimulatedAccountSource};
use crate::services::platform::PlatformContext;
use crate::services::query_client::QueryClient;
use crate::services::remote_registry::{RemoteRegistration, RemoteRegistry};

use super::shell::ShellApp;

/// Shared cache and account provider for one process.
pub fn platform_context(config: &Config) -> PlatformContext {
    let client = QueryClient::from_config(&config.cache);
    let source = SimulatedAccountSource::new(std::time::Duration::from_millis(
        config.account.simulated_delay_ms,
    ));
    let account = AccountProvider::new(client.clone(), Arc::new(source));
    PlatformContext::new(client, account, config.cache.render_timeout())
}

/// Register every remote, rejecting the whole set on the first conflict.
pub fn build_registry(registrations: Vec<RemoteRegistration>) -> DomainResult<RemoteRegistry> {
    let mut registry = RemoteRegistry::new();
    for registration in registrations {
        registry.register_remote(registration)?;
    }
    Ok(registry)
}

/// Shell with the configured remotes, not yet started.
pub fn build_shell(config: &Config) -> DomainResult<ShellApp> {
    let github = GitHubClient::from_config(&config.github);
    let registry = build_registry(remotes::registrations(config, &github)?)?;
    ShellApp::new(registry, platform_context(config), config.cache.load_timeout())
}

/// The compiled-in module for a standalone remote process.
pub fn standalone_remote(name: &str, config: &Config) -> DomainResult<Arc<dyn RemoteModule>> {
    let github = GitHubClient::from_config(&config.github);
    remotes::builtin_module(name, config, &github)
        .ok_or_else(|| DomainError::RemoteNotFound(name.to_string()))
}
