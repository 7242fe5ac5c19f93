//! CLI module
//!
//! Command-line interface for running the node outside a workflow host.
//!
//! # Commands
//!
//! - `execute` - Run an operation over input items
//! - `check` - Test the credentials
//! - `options` - Run a load-options method
//! - `describe` - Print the node description

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
