//! Implementation of the `mfe-shell serve` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::http::{HttpConfig, ShellServer};
use crate::application::build_shell;
use crate::domain::models::config::Config;

/// Arguments of `mfe-shell serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,
}

/// Build the shell from configuration and serve it until Ctrl-C.
pub async fn execute(args: ServeArgs, config: Config) -> Result<()> {
    let mut http = HttpConfig::from(&config.server);
    if let Some(port) = args.port {
        http.port = port;
    }
    if let Some(host) = args.host {
        http.host = host;
    }

    let shell = Arc::new(build_shell(&config).context("Failed to build shell")?);
    let bootstrap = shell.start();

    let server = ShellServer::new(Arc::clone(&shell), http);
    let result = server
        .serve_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await;

    bootstrap.abort();
    shell.shutdown();
    result.map_err(|e| anyhow::anyhow!(e)).context("Shell server failed")
}
