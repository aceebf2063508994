//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::models::config::Config;
use crate::infrastructure::config::ConfigLoader;

/// Top-level arguments.
#[derive(Parser, Debug)]
#[command(name = "mfe-shell")]
#[command(about = "Micro-frontend shell composing independently deployed remotes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .mfe-shell/config.yaml)
    #[arg(short, long, global = true, env = "MFE_SHELL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the shell server
    Serve(commands::serve::ServeArgs),

    /// Run one remote as a standalone server
    Remote(commands::remote::RemoteArgs),

    /// List registered routes
    Routes,

    /// Show the effective configuration
    Config,
}

impl Cli {
    /// Load configuration from `--config` or the default hierarchy.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        }
    }
}

/// Print an error in the selected output mode and exit non-zero.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1)
}
