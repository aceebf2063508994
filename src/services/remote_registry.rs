//! Registry of remotes and the routes they contribute.
//!
//! The [`RemoteRegistry`] records, per remote, the loader that yields its
//! code and the route descriptors it exposes. Route metadata is known at
//! registration time; the pages behind the routes are resolved lazily by
//! the shell through the loader.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::errors::RegistryError;
use crate::domain::models::{ExposedRoute, NavItem, RouteDescriptor};
use crate::domain::ports::ModuleLoader;

/// Everything needed to register one remote.
#[derive(Clone)]
pub struct RemoteRegistration {
    /// Remote name, unique in the registry.
    pub name: String,
    /// Yields the remote's code on first navigation.
    pub loader: Arc<dyn ModuleLoader>,
    /// Routes the remote exposes.
    pub routes: Vec<ExposedRoute>,
}

impl std::fmt::Debug for RemoteRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRegistration")
            .field("name", &self.name)
            .field("loader", &self.loader.kind())
            .field("routes", &self.routes)
            .finish()
    }
}

impl RemoteRegistration {
    /// Registration of `name` with the routes it exposes.
    pub fn new(name: impl Into<String>, loader: Arc<dyn ModuleLoader>, routes: Vec<ExposedRoute>) -> Self {
        Self {
            name: name.into(),
            loader,
            routes,
        }
    }
}

struct RegisteredRemote {
    name: String,
    loader: Arc<dyn ModuleLoader>,
    routes: Vec<RouteDescriptor>,
}

/// Remotes in registration order.
#[derive(Default)]
pub struct RemoteRegistry {
    remotes: Vec<RegisteredRemote>,
}

impl std::fmt::Debug for RemoteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRegistry")
            .field("remotes", &self.remote_names())
            .field(
                "routes",
                &self.all_routes().iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl RemoteRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a remote, replacing the routes of a remote with the same name.
    ///
    /// A replaced remote keeps its original registration position. Route ids
    /// and paths must be unique across all remotes; on conflict nothing is
    /// changed.
    pub fn register_remote(&mut self, registration: RemoteRegistration) -> Result<(), RegistryError> {
        let RemoteRegistration {
            name,
            loader,
            routes,
        } = registration;

        if name.trim().is_empty() {
            return Err(RegistryError::InvalidRegistration {
                name,
                reason: "remote name cannot be empty".to_string(),
            });
        }

        let mut owners_by_id: HashMap<&str, &str> = HashMap::new();
        let mut owners_by_path: HashMap<&str, &str> = HashMap::new();
        for remote in self.remotes.iter().filter(|r| r.name != name) {
            for route in &remote.routes {
                owners_by_id.insert(&route.id, &remote.name);
                owners_by_path.insert(&route.path, &remote.name);
            }
        }

        let mut seen_ids = HashSet::new();
        let mut seen_paths = HashSet::new();
        for route in &routes {
            if let Some(owner) = owners_by_id.get(route.id.as_str()) {
                return Err(RegistryError::DuplicateRouteId {
                    id: route.id.clone(),
                    owner: (*owner).to_string(),
                });
            }
            if !seen_ids.insert(route.id.as_str()) {
                return Err(RegistryError::DuplicateRouteId {
                    id: route.id.clone(),
                    owner: name.clone(),
                });
            }
            if let Some(owner) = owners_by_path.get(route.path.as_str()) {
                return Err(RegistryError::DuplicatePath {
                    path: route.path.clone(),
                    owner: (*owner).to_string(),
                });
            }
            if !seen_paths.insert(route.path.as_str()) {
                return Err(RegistryError::DuplicatePath {
                    path: route.path.clone(),
                    owner: name.clone(),
                });
            }
        }

        let descriptors: Vec<RouteDescriptor> = routes
            .into_iter()
            .map(|r| RouteDescriptor::from_exposed(name.clone(), r))
            .collect();

        tracing::info!(
            remote = %name,
            loader = %loader.kind(),
            routes = descriptors.len(),
            "Registered remote"
        );

        if let Some(existing) = self.remotes.iter_mut().find(|r| r.name == name) {
            existing.loader = loader;
            existing.routes = descriptors;
        } else {
            self.remotes.push(RegisteredRemote {
                name,
                loader,
                routes: descriptors,
            });
        }
        Ok(())
    }

    /// All routes, remotes in registration order and routes in declaration order.
    pub fn all_routes(&self) -> Vec<RouteDescriptor> {
        self.remotes
            .iter()
            .flat_map(|r| r.routes.iter().cloned())
            .collect()
    }

    /// Sidebar entries sorted by order; unordered entries follow, in
    /// registration order.
    pub fn nav_items(&self) -> Vec<NavItem> {
        let mut with_nav: Vec<(Option<i32>, NavItem)> = self
            .remotes
            .iter()
            .flat_map(|r| r.routes.iter())
            .filter_map(|route| {
                route.nav.as_ref().map(|nav| {
                    (
                        nav.order,
                        NavItem {
                            path: route.path.clone(),
                            label: nav.label.clone(),
                        },
                    )
                })
            })
            .collect();
        // sort_by_key is stable, so ties keep registration order.
        with_nav.sort_by_key(|(order, _)| (order.is_none(), *order));
        with_nav.into_iter().map(|(_, item)| item).collect()
    }

    /// Route registered at exactly `path`.
    pub fn route_by_path(&self, path: &str) -> Option<&RouteDescriptor> {
        self.remotes
            .iter()
            .flat_map(|r| r.routes.iter())
            .find(|route| route.path == path)
    }

    /// Route with the given id.
    pub fn route_by_id(&self, id: &str) -> Option<&RouteDescriptor> {
        self.remotes
            .iter()
            .flat_map(|r| r.routes.iter())
            .find(|route| route.id == id)
    }

    /// Loader of a registered remote.
    pub fn loader_for(&self, remote: &str) -> Option<Arc<dyn ModuleLoader>> {
        self.remotes
            .iter()
            .find(|r| r.name == remote)
            .map(|r| Arc::clone(&r.loader))
    }

    /// Remote names in registration order.
    pub fn remote_names(&self) -> Vec<&str> {
        self.remotes.iter().map(|r| r.name.as_str()).collect()
    }

    /// Whether no remote is registered.
    pub fn is_empty(&self) -> bool {
        self.remotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::LoadError;
    use crate::domain::models::NavMeta;
    use crate::domain::ports::{LoaderKind, RemoteModule};
    use async_trait::async_trait;

    struct NeverLoader;

    #[async_trait]
    impl ModuleLoader for NeverLoader {
        fn kind(&self) -> LoaderKind {
            LoaderKind::LocalStatic
        }

        async fn load(&self) -> Result<Arc<dyn RemoteModule>, LoadError> {
            Err(LoadError::Unavailable("never".to_string()))
        }
    }

    fn registration(name: &str, routes: Vec<ExposedRoute>) -> RemoteRegistration {
        RemoteRegistration::new(name, Arc::new(NeverLoader), routes)
    }

    fn route(id: &str, path: &str, order: Option<i32>) -> ExposedRoute {
        ExposedRoute::new(id, path, Some(NavMeta::new(id, order)))
    }

    #[test]
    fn test_nav_order_with_missing_order_last() {
        let mut registry = RemoteRegistry::new();
        registry.register_remote(registration("a", vec![route("three", "/a", Some(3))])).unwrap();
        registry.register_remote(registration("b", vec![route("one", "/b", Some(1))])).unwrap();
        registry.register_remote(registration("c", vec![route("none", "/c", None)])).unwrap();
        registry.register_remote(registration("d", vec![route("two", "/d", Some(2))])).unwrap();

        let labels: Vec<_> = registry.nav_items().into_iter().map(|n| n.label).collect();
        assert_eq!(labels, vec!["one", "two", "three", "none"]);
    }

    #[test]
    fn test_routes_without_nav_are_hidden() {
        let mut registry = RemoteRegistry::new();
        registry
            .register_remote(registration(
                "reports",
                vec![
                    route("reports-home", "/reports", Some(2)),
                    ExposedRoute::new("reports-detail", "/reports/detail", None),
                ],
            ))
            .unwrap();
        assert_eq!(registry.all_routes().len(), 2);
        assert_eq!(registry.nav_items().len(), 1);
    }

    #[test]
    fn test_reregistering_replaces_routes_in_place() {
        let mut registry = RemoteRegistry::new();
        registry.register_remote(registration("traffic", vec![route("t1", "/t1", None)])).unwrap();
        registry.register_remote(registration("admin", vec![route("a1", "/a1", None)])).unwrap();
        registry.register_remote(registration("traffic", vec![route("t2", "/t2", None)])).unwrap();

        assert_eq!(registry.remote_names(), vec!["traffic", "admin"]);
        let ids: Vec<_> = registry.all_routes().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["t2", "a1"]);
        assert!(registry.route_by_id("t1").is_none());
    }

    #[test]
    fn test_duplicate_route_id_across_remotes_rejected() {
        let mut registry = RemoteRegistry::new();
        registry.register_remote(registration("traffic", vec![route("home", "/traffic", None)])).unwrap();
        let err = registry
            .register_remote(registration("admin", vec![route("home", "/admin", None)]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRouteId { ref owner, .. } if owner == "traffic"));
        assert_eq!(registry.remote_names(), vec!["traffic"]);
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut registry = RemoteRegistry::new();
        registry.register_remote(registration("traffic", vec![route("t", "/x", None)])).unwrap();
        let err = registry
            .register_remote(registration("admin", vec![route("a", "/x", None)]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicatePath { .. }));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = RemoteRegistry::new();
        let err = registry.register_remote(registration(" ", vec![])).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRegistration { .. }));
    }

    #[test]
    fn test_lookups() {
        let mut registry = RemoteRegistry::new();
        registry
            .register_remote(registration("admin", vec![route("admin-home", "/admin", Some(3))]))
            .unwrap();
        assert_eq!(registry.route_by_path("/admin").unwrap().remote, "admin");
        assert_eq!(registry.route_by_id("admin-home").unwrap().path, "/admin");
        assert!(registry.loader_for("admin").is_some());
        assert!(registry.loader_for("traffic").is_none());
    }
}
