//! mfe-shell CLI entry point.

use clap::Parser;

use mfe_shell::cli::{commands, handle_error, Cli, Commands};
use mfe_shell::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(err) => handle_error(&err, cli.json),
    };

    let mut log_config = LogConfig::from(&config.logging);
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => logger,
        Err(err) => handle_error(&err, cli.json),
    };

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Remote(args) => commands::remote::execute(args, config).await,
        Commands::Routes => commands::routes::execute(&config, cli.json),
        Commands::Config => commands::config::execute(config, cli.json),
    };

    if let Err(err) = result {
        handle_error(&err, cli.json);
    }
}
