//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, load_config_from_json, NodeConfig};
use crate::description::description;
use crate::error::{Error, Result};
use crate::http::ShopwareClient;
use crate::load_options::{self, LoadOptionsMethod};
use crate::node::ShopwareNode;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Execute {
                resource,
                operation,
                params_json,
                input,
            } => {
                let items = match (params_json, input) {
                    (Some(inline), _) => parse_items(inline)?,
                    (None, Some(path)) => read_items(path)?,
                    (None, None) => vec![json!({})],
                };
                self.execute(resource, operation, &items).await
            }
            Commands::Check => self.check().await,
            Commands::Options { method } => self.options(method).await,
            Commands::Describe => {
                self.output(&description());
                Ok(())
            }
        }
    }

    /// Load configuration; inline JSON wins over the file, the environment
    /// overrides both
    fn load_config(&self) -> Result<NodeConfig> {
        let mut config = if let Some(inline) = &self.cli.config_json {
            load_config_from_json(inline)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?
        } else if let Some(path) = &self.cli.config {
            load_config(path)?
        } else {
            NodeConfig::default()
        };

        config.apply_env();
        config.continue_on_fail |= self.cli.continue_on_fail;
        Ok(config)
    }

    fn client(&self) -> Result<(NodeConfig, ShopwareClient)> {
        let config = self.load_config()?;
        let client = ShopwareClient::new(&config)?;
        Ok((config, client))
    }

    /// Run an operation and print one row per output item
    async fn execute(&self, resource: &str, operation: &str, items: &[Value]) -> Result<()> {
        let (config, client) = self.client()?;
        info!(resource, operation, items = items.len(), "Executing");

        let node = ShopwareNode::new(client).with_continue_on_fail(config.continue_on_fail);
        let rows = node.execute(resource, operation, items).await?;

        match self.cli.format {
            OutputFormat::Json => rows.iter().for_each(|row| self.output(row)),
            OutputFormat::Pretty => self.output(&rows),
        }
        Ok(())
    }

    /// Credential test
    async fn check(&self) -> Result<()> {
        let (config, client) = self.client()?;
        info!(domain = %config.credentials.domain, "Checking credentials");

        match client.check().await {
            Ok(version) => self.output(&json!({
                "status": "SUCCEEDED",
                "message": "Connection successful",
                "version": version.get("version").cloned().unwrap_or(Value::Null),
            })),
            Err(e) => self.output(&json!({
                "status": "FAILED",
                "message": format!("Connection failed: {e}"),
            })),
        }
        Ok(())
    }

    /// Run a load-options method
    async fn options(&self, method: &str) -> Result<()> {
        let method: LoadOptionsMethod = method.parse()?;
        let (_, client) = self.client()?;
        let options = load_options::load(&client, method).await?;
        self.output(&options);
        Ok(())
    }

    /// Output a value
    fn output<T: Serialize>(&self, value: &T) {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value),
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
        };
        println!("{}", text.unwrap_or_default());
    }
}

/// Input items: a JSON array is many items, anything else one item
fn parse_items(text: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::config(format!("Invalid parameters JSON: {e}")))?;
    match value {
        Value::Array(items) => Ok(items),
        item @ Value::Object(_) => Ok(vec![item]),
        other => Err(Error::config(format!(
            "Parameters must be a JSON object or array, got {other}"
        ))),
    }
}

fn read_items(path: &Path) -> Result<Vec<Value>> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    parse_items(&text)
}
