//! # Resolve Command Implementation
//!
//! This module implements the `resolve` subcommand, which prints the fully
//! merged property set of one path: the schema defaults, overridden by every
//! matching node of the declaration from the root down.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::{Args, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;

use path_properties::output::OutputConfig;
use path_properties::resolve::ResolvedProperties;
use path_properties::tree::PropertyTree;

/// Print the merged properties of a path
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Path relative to the root of the source tree, e.g. userland/c/exit1.c
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// One `name: value` line per property
    #[default]
    Text,
    Yaml,
    Json,
}

/// Execute the `resolve` command.
pub fn execute(args: ResolveArgs, tree: &PropertyTree, color_flag: &str) -> Result<()> {
    let resolved = tree.resolve(&args.path);
    let out = OutputConfig::from_env_and_flag(color_flag);
    let mut stdout = io::stdout().lock();
    write_resolved(&mut stdout, &resolved, args.format, &out)
}

fn write_resolved<W: Write>(
    w: &mut W,
    resolved: &ResolvedProperties,
    format: OutputFormat,
    out: &OutputConfig,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for (property, value) in resolved.properties().iter() {
                writeln!(w, "{}: {}", out.key(property.as_str()), value)?;
            }
        }
        OutputFormat::Yaml => write!(w, "{}", serde_yaml::to_string(resolved)?)?,
        OutputFormat::Json => writeln!(w, "{}", serde_json::to_string_pretty(resolved)?)?,
    }
    Ok(())
}
