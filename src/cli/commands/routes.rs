//! Implementation of the `mfe-shell routes` command.

use anyhow::{Context, Result};
use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use serde::Serialize;

use crate::application::build_shell;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::config::Config;
use crate::domain::models::RouteDescriptor;

/// One line of the `routes` listing.
#[derive(Debug, Serialize)]
pub struct RouteRow {
    /// Route id.
    pub id: String,
    /// Path the route is served at.
    pub path: String,
    /// Owning remote.
    pub remote: String,
    /// How the remote's code is obtained.
    pub loader: String,
    /// Sidebar label, if listed.
    pub label: Option<String>,
    /// Sidebar position.
    pub order: Option<i32>,
}

/// Result of the `routes` command.
#[derive(Debug, Serialize)]
pub struct RoutesOutput {
    /// Routes in registration order.
    pub routes: Vec<RouteRow>,
}

impl CommandOutput for RoutesOutput {
    fn to_human(&self) -> String {
        if self.routes.is_empty() {
            return "No routes registered.".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(
                ["Path", "Route", "Remote", "Loader", "Nav"]
                    .into_iter()
                    .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                    .collect::<Vec<_>>(),
            );

        for route in &self.routes {
            let nav = match (&route.label, route.order) {
                (Some(label), Some(order)) => format!("{label} ({order})"),
                (Some(label), None) => label.clone(),
                (None, _) => "-".to_string(),
            };
            table.add_row(vec![
                Cell::new(&route.path),
                Cell::new(&route.id),
                Cell::new(&route.remote),
                Cell::new(&route.loader),
                Cell::new(nav),
            ]);
        }
        table.to_string()
    }
}

fn row(route: RouteDescriptor, loader: String) -> RouteRow {
    RouteRow {
        label: route.nav.as_ref().map(|n| n.label.clone()),
        order: route.nav.as_ref().and_then(|n| n.order),
        id: route.id,
        path: route.path,
        remote: route.remote,
        loader,
    }
}

/// Registered routes for `config`, without loading any remote.
pub fn collect(config: &Config) -> Result<RoutesOutput> {
    let shell = build_shell(config).context("Failed to build shell")?;
    let registry = shell.registry();
    let routes = registry
        .all_routes()
        .into_iter()
        .map(|route| {
            let loader = registry
                .loader_for(&route.remote)
                .map_or_else(|| "-".to_string(), |l| l.kind().to_string());
            row(route, loader)
        })
        .collect();
    Ok(RoutesOutput { routes })
}

/// Run the command and print its output.
pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    output(&collect(config)?, json_mode);
    Ok(())
}
