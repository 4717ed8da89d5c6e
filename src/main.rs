//! # Path Properties CLI
//!
//! This is the binary entry point for the `path-properties` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//!
//! Resolution and the eligibility rules live in the library crate; the binary
//! only loads a declaration, builds the environment from flags and prints.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
