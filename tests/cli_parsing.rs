//! CLI argument parsing.

use clap::Parser;

use mfe_shell::cli::{Cli, Commands};

#[test]
fn test_routes_with_json() {
    let cli = Cli::try_parse_from(["mfe-shell", "--json", "routes"]).unwrap();
    assert!(cli.json);
    assert!(matches!(cli.command, Commands::Routes));
}

#[test]
fn test_serve_overrides() {
    let cli = Cli::try_parse_from(["mfe-shell", "serve", "--host", "0.0.0.0", "-p", "8080"]).unwrap();
    let Commands::Serve(args) = cli.command else {
        panic!("expected serve");
    };
    assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
    assert_eq!(args.port, Some(8080));
}

#[test]
fn test_config_flag_and_verbose() {
    let cli = Cli::try_parse_from(["mfe-shell", "config", "--config", "/etc/shell.yaml", "-v"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.config.unwrap().to_str(), Some("/etc/shell.yaml"));
}

#[test]
fn test_unknown_command_fails() {
    assert!(Cli::try_parse_from(["mfe-shell", "deploy"]).is_err());
}
