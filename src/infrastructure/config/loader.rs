//! Layered configuration loading and validation.

use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::{Config, RemoteConfig, RemoteMode};

/// Per-remote URL variables. Setting one serves that remote from its URL.
pub const REMOTE_URL_VARS: [(&str, &str); 3] = [
    ("traffic", "TRAFFIC_REMOTE_URL"),
    ("reports", "REPORTS_REMOTE_URL"),
    ("admin", "ADMIN_REMOTE_URL"),
];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Port 0 was configured.
    #[error("Invalid server port: {0}. Must be non-zero")]
    InvalidPort(u16),

    /// The bind host is blank.
    #[error("Server host cannot be empty")]
    EmptyHost,

    /// Unknown log level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown log format.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// Unknown rotation policy.
    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    /// A timeout is zero; carries the setting name.
    #[error("Invalid {0}: must be greater than zero")]
    ZeroTimeout(&'static str),

    /// A remote URL is not http(s).
    #[error("Invalid URL for remote '{remote}': {url}. Must start with http:// or https://")]
    InvalidRemoteUrl {
        /// Remote name.
        remote: String,
        /// Offending URL.
        url: String,
    },

    /// A configured route path is not a local absolute path.
    #[error("Invalid route path '{path}' for remote '{remote}'. Must start with a single '/'")]
    InvalidRoutePath {
        /// Remote declaring the route.
        remote: String,
        /// Offending path.
        path: String,
    },

    /// Any other invalid setting.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .mfe-shell/config.yaml (project config)
    /// 3. .mfe-shell/local.yaml (local overrides, optional)
    /// 4. Environment variables (`MFE_SHELL_*` prefix, `__` for nesting)
    /// 5. `TRAFFIC_REMOTE_URL`, `REPORTS_REMOTE_URL`, `ADMIN_REMOTE_URL`
    pub fn load() -> Result<Config> {
        let mut config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".mfe-shell/config.yaml"))
            .merge(Yaml::file(".mfe-shell/local.yaml"))
            .merge(Env::prefixed("MFE_SHELL_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::apply_remote_url_overrides(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let mut config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("MFE_SHELL_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::apply_remote_url_overrides(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Point built-in remotes at the URLs given by their variables.
    pub fn apply_remote_url_overrides(config: &mut Config) {
        for (name, var) in REMOTE_URL_VARS {
            let Ok(url) = std::env::var(var) else {
                continue;
            };
            if url.trim().is_empty() {
                continue;
            }
            tracing::debug!(remote = name, url = %url, "Remote URL from {}", var);
            let remote = config
                .remotes
                .entry(name.to_string())
                .or_insert_with(|| RemoteConfig::remote(url.clone()));
            remote.url = url;
            remote.mode = RemoteMode::Remote;
        }
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Server
        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort(config.server.port));
        }
        if config.server.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        // Cache timings
        if config.cache.render_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("render_timeout_ms"));
        }
        if config.cache.load_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("load_timeout_ms"));
        }
        if config.cache.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("request_timeout_ms"));
        }
        if config.github.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("github.timeout_secs"));
        }

        if config.github.requests_per_hour == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "github.requests_per_hour must be greater than zero".to_string(),
            ));
        }

        // Remotes
        for (name, remote) in &config.remotes {
            if !(remote.url.starts_with("http://") || remote.url.starts_with("https://")) {
                return Err(ConfigError::InvalidRemoteUrl {
                    remote: name.clone(),
                    url: remote.url.clone(),
                });
            }
            for route in &remote.routes {
                if !route.path.starts_with('/') || route.path.starts_with("//") {
                    return Err(ConfigError::InvalidRoutePath {
                        remote: name.clone(),
                        path: route.path.clone(),
                    });
                }
                if route.id.trim().is_empty() {
                    return Err(ConfigError::ValidationFailed(format!(
                        "route id for remote '{name}' cannot be empty"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::RouteConfig;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
server:
  port: 8080
remotes:
  reports:
    mode: remote
    url: http://reports.internal:3003
cache:
  stale_time_ms: 1000
github:
  traffic_repo:
    owner: rust-lang
    repo: rust
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.remotes["reports"].mode, RemoteMode::Remote);
        assert_eq!(config.cache.stale_time_ms, 1000);
        assert_eq!(config.cache.render_timeout_ms, 3000);
        assert_eq!(config.github.traffic_repo.owner, "rust-lang");
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidPort(0)
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLogFormat(_)
        ));
    }

    #[test]
    fn test_validate_invalid_rotation() {
        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidRotation(_)
        ));
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let mut config = Config::default();
        config.cache.render_timeout_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ZeroTimeout("render_timeout_ms")
        ));

        let mut config = Config::default();
        config.cache.load_timeout_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ZeroTimeout("load_timeout_ms")
        ));

        let mut config = Config::default();
        config.cache.request_timeout_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ZeroTimeout("request_timeout_ms")
        ));

        let mut config = Config::default();
        config.github.timeout_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ZeroTimeout("github.timeout_secs")
        ));
    }

    #[test]
    fn test_zero_stale_time_is_allowed() {
        let mut config = Config::default();
        config.cache.stale_time_ms = 0;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_remote_url_scheme() {
        let mut config = Config::default();
        config
            .remotes
            .insert("admin".to_string(), RemoteConfig::remote("localhost:3004"));
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidRemoteUrl { ref remote, .. } if remote == "admin"
        ));
    }

    #[test]
    fn test_validate_route_path() {
        let mut config = Config::default();
        let mut billing = RemoteConfig::remote("http://localhost:3005");
        billing.routes.push(RouteConfig {
            id: "billing-home".to_string(),
            path: "billing".to_string(),
            label: None,
            order: None,
        });
        config.remotes.insert("billing".to_string(), billing.clone());
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidRoutePath { .. }
        ));

        billing.routes[0].path = "//billing.example".to_string();
        config.remotes.insert("billing".to_string(), billing);
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidRoutePath { .. }
        ));
    }

    #[test]
    fn test_remote_url_variable_switches_mode() {
        temp_env::with_var("REPORTS_REMOTE_URL", Some("http://reports.example:9000"), || {
            let mut config = Config::default();
            ConfigLoader::apply_remote_url_overrides(&mut config);
            let reports = &config.remotes["reports"];
            assert_eq!(reports.url, "http://reports.example:9000");
            assert_eq!(reports.mode, RemoteMode::Remote);
            assert_eq!(config.remotes["traffic"].mode, RemoteMode::Local);
        });
    }

    #[test]
    fn test_empty_remote_url_variable_is_ignored() {
        temp_env::with_var("ADMIN_REMOTE_URL", Some(""), || {
            let mut config = Config::default();
            ConfigLoader::apply_remote_url_overrides(&mut config);
            assert_eq!(config.remotes["admin"].mode, RemoteMode::Local);
        });
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "server:\n  port: 4000\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "server:\n  port: 4001\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.server.port, 4001, "Override should win");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
        assert_eq!(config.remotes.len(), 3);
    }
}
