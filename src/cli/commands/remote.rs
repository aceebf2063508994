//! Implementation of the `mfe-shell remote <name>` command.

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::http::{HttpConfig, RemoteServer};
use crate::application::{platform_context, standalone_remote};
use crate::domain::models::config::Config;

/// Arguments of `mfe-shell remote`.
#[derive(Args, Debug)]
pub struct RemoteArgs {
    /// Remote to serve (traffic, reports, admin)
    pub name: String,

    /// Port to listen on (defaults to the port in the remote's URL)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Serve one compiled-in remote on its own port until Ctrl-C.
pub async fn execute(args: RemoteArgs, config: Config) -> Result<()> {
    let module = standalone_remote(&args.name, &config)
        .with_context(|| format!("Cannot serve remote '{}'", args.name))?;

    let port = args
        .port
        .or_else(|| config.remote(&args.name).and_then(|r| r.port()))
        .context("No port given and the remote's URL has none")?;
    let http = HttpConfig::from(&config.server).with_port(port);

    let ctx = platform_context(&config);
    ctx.account.prefetch().await;

    RemoteServer::new(module, ctx, http)
        .serve_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("Remote server failed")
}
