//! Wire format of a standalone remote's well-known entry.
//!
//! A remote served by its own process publishes `GET /remoteEntry.json`.
//! The shell's dynamic loader reads it to discover the routes module.

use serde::{Deserialize, Serialize};

use super::route::{ExposedRoute, NavMeta};

/// Path of the well-known entry, relative to a remote's base URL.
pub const REMOTE_ENTRY_PATH: &str = "/remoteEntry.json";

/// One route listed in a remote entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntryRoute {
    /// Route id.
    pub id: String,
    /// Absolute path in the shell.
    pub path: String,
    /// Sidebar metadata; hidden when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav: Option<NavMeta>,
    /// Path, relative to the remote base URL, serving the page as JSON.
    pub fragment: String,
}

impl RemoteEntryRoute {
    /// Conventional fragment path for a route id.
    pub fn fragment_path(route_id: &str) -> String {
        format!("/fragments/{route_id}")
    }

    /// The route as the registry sees it.
    pub fn exposed(&self) -> ExposedRoute {
        ExposedRoute::new(self.id.clone(), self.path.clone(), self.nav.clone())
    }
}

/// The routes module published by a remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntryManifest {
    /// Remote name.
    pub name: String,
    /// Routes in declaration order.
    #[serde(default)]
    pub routes: Vec<RemoteEntryRoute>,
}

impl RemoteEntryManifest {
    /// Build the manifest a remote publishes for its exposed routes.
    pub fn from_routes(name: impl Into<String>, routes: &[ExposedRoute]) -> Self {
        Self {
            name: name.into(),
            routes: routes
                .iter()
                .map(|r| RemoteEntryRoute {
                    id: r.id.clone(),
                    path: r.path.clone(),
                    nav: r.nav.clone(),
                    fragment: RemoteEntryRoute::fragment_path(&r.id),
                })
                .collect(),
        }
    }

    /// Check structural validity: non-empty name, ids and absolute paths.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("remote name cannot be empty".to_string());
        }
        for route in &self.routes {
            if route.id.trim().is_empty() {
                return Err("route id cannot be empty".to_string());
            }
            if !route.path.starts_with('/') {
                return Err(format!("route '{}' path must start with '/'", route.id));
            }
            if !route.fragment.starts_with('/') {
                return Err(format!("route '{}' fragment must start with '/'", route.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_from_routes_uses_fragment_convention() {
        let routes = vec![ExposedRoute::new(
            "traffic-home",
            "/traffic",
            Some(NavMeta::new("Traffic", Some(1))),
        )];
        let manifest = RemoteEntryManifest::from_routes("traffic", &routes);
        assert_eq!(manifest.routes[0].fragment, "/fragments/traffic-home");
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_relative_path() {
        let manifest = RemoteEntryManifest {
            name: "reports".to_string(),
            routes: vec![RemoteEntryRoute {
                id: "reports-home".to_string(),
                path: "reports".to_string(),
                nav: None,
                fragment: "/fragments/reports-home".to_string(),
            }],
        };
        assert!(manifest.validate().unwrap_err().contains("must start with '/'"));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let manifest = RemoteEntryManifest {
            name: " ".to_string(),
            routes: vec![],
        };
        assert!(manifest.validate().is_err());
    }
}
