//! Route descriptors and navigation metadata.

use serde::{Deserialize, Serialize};

/// Sidebar metadata attached to a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavMeta {
    /// Sidebar label.
    pub label: String,
    /// Sort key; routes without one sort after every ordered route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl NavMeta {
    /// Nav entry labelled `label`.
    pub fn new(label: impl Into<String>, order: Option<i32>) -> Self {
        Self {
            label: label.into(),
            order,
        }
    }
}

/// A route as exposed by a remote module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposedRoute {
    /// Route id, unique across remotes.
    pub id: String,
    /// Absolute path.
    pub path: String,
    /// Sidebar entry; hidden when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav: Option<NavMeta>,
}

impl ExposedRoute {
    /// Route `id` served at `path`.
    pub fn new(id: impl Into<String>, path: impl Into<String>, nav: Option<NavMeta>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            nav,
        }
    }
}

/// A navigable unit registered with the shell.
///
/// Immutable once registered; the page behind it is resolved lazily through
/// the owning remote's loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Route id, unique across remotes.
    pub id: String,
    /// Absolute path.
    pub path: String,
    /// Remote that provides the page.
    pub remote: String,
    /// Sidebar entry; hidden when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav: Option<NavMeta>,
}

impl RouteDescriptor {
    /// Bind an exposed route to the remote that owns it.
    pub fn from_exposed(remote: impl Into<String>, route: ExposedRoute) -> Self {
        Self {
            id: route.id,
            path: route.path,
            remote: remote.into(),
            nav: route.nav,
        }
    }
}

/// Entry rendered in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    /// Link target.
    pub path: String,
    /// Link text.
    pub label: String,
}

/// Whether the sidebar entry at `item_path` is active for `current`.
pub fn is_active_path(current: &str, item_path: &str) -> bool {
    current == item_path || current.starts_with(&format!("{}/", item_path.trim_end_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_path_matches_exact_and_children() {
        assert!(is_active_path("/traffic", "/traffic"));
        assert!(is_active_path("/traffic/daily", "/traffic"));
        assert!(!is_active_path("/trafficking", "/traffic"));
        assert!(!is_active_path("/", "/traffic"));
    }

    #[test]
    fn test_nav_meta_order_is_optional_in_json() {
        let nav: NavMeta = serde_json::from_str(r#"{"label":"Reports"}"#).unwrap();
        assert_eq!(nav.order, None);
        let json = serde_json::to_string(&NavMeta::new("Traffic", Some(1))).unwrap();
        assert_eq!(json, r#"{"label":"Traffic","order":1}"#);
    }
}
