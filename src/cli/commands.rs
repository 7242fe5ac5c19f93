//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Shopware 6 Admin API node
#[derive(Parser, Debug)]
#[command(name = "shopware-node")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit an error row for failing items instead of stopping
    #[arg(long, global = true)]
    pub continue_on_fail: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an operation over one or more input items
    Execute {
        /// Resource (customer, product, order, category)
        resource: String,

        /// Operation (create, get, getMany, update, delete)
        operation: String,

        /// Parameters of one item, or a JSON array of items
        #[arg(long, conflicts_with = "input")]
        params_json: Option<String>,

        /// File holding the item parameters (JSON object or array)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Test the credentials against the shop
    Check,

    /// Run a load-options method (e.g. getOrderCurrencies)
    Options {
        /// Method name
        method: String,
    },

    /// Print the node description
    Describe,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one row per line)
    Json,
    /// Human-readable output
    Pretty,
}
