//! CLI argument parsing and command dispatch

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

use crate::commands;

/// Path Properties - Per-path build and test properties of an example tree
#[derive(Parser, Debug)]
#[command(name = "path-properties")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Declaration file to use instead of the built-in one
    #[arg(long, global = true, value_name = "FILE", env = "PATH_PROPERTIES_FILE")]
    properties: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the merged properties of a path
    Resolve(commands::resolve::ResolveArgs),

    /// Decide whether a path is built and tested
    Check(commands::check::CheckArgs),

    /// List the buildable or testable files under a directory
    Ls(commands::ls::LsArgs),

    /// Display the declaration tree
    Tree(commands::tree::TreeArgs),

    /// Validate a declaration file
    Validate(commands::validate::ValidateArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level)?;

        let properties = self.properties.as_deref();
        match self.command {
            Commands::Resolve(args) => {
                commands::resolve::execute(args, &commands::load_tree(properties)?, &self.color)
            }
            Commands::Check(args) => {
                commands::check::execute(args, &commands::load_tree(properties)?, &self.color)
            }
            Commands::Ls(args) => commands::ls::execute(args, &commands::load_tree(properties)?),
            Commands::Tree(args) => commands::tree::execute(args, properties),
            Commands::Validate(args) => commands::validate::execute(args, properties, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter: LevelFilter = level
        .parse()
        .map_err(|_| anyhow!("Invalid log level '{}' (expected error, warn, info, debug or trace)", level))?;
    // A logger may already be installed when running under a test harness.
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .format_timestamp(None)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_init_logging_rejects_unknown_level() {
        assert!(init_logging("loud").is_err());
        assert!(init_logging("debug").is_ok());
    }
}
