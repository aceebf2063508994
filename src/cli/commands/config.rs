//! Implementation of the `mfe-shell config` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::config::Config;

/// Result of the `config` command.
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    /// Effective configuration, token redacted.
    #[serde(flatten)]
    pub config: Config,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        let mut redacted = self.config.clone();
        if redacted.github.token.is_some() {
            redacted.github.token = Some("***".to_string());
        }
        serde_yaml::to_string(&redacted).unwrap_or_default()
    }

    fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(&self.config).unwrap_or_default();
        if self.config.github.token.is_some() {
            value["github"]["token"] = serde_json::Value::String("***".to_string());
        }
        value
    }
}

/// Run the command and print its output.
pub fn execute(config: Config, json_mode: bool) -> Result<()> {
    output(&ConfigOutput { config }, json_mode);
    Ok(())
}
