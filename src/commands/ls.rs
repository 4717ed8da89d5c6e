//! # Ls Command Implementation
//!
//! This module implements the `ls` subcommand, which walks a source tree and
//! lists the files that would be built (or, with `--tested`, run as tests) in
//! the given environment.
//!
//! ## Functionality
//!
//! - **Tree Walk**: Visits every regular file under the root directory.
//! - **Parallel Evaluation**: Resolves and checks files in parallel against
//!   one shared override tree.
//! - **Pattern Filtering**: Supports glob patterns to restrict the listing.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::{Context, Result};
use clap::Args;
use rayon::prelude::*;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use path_properties::env::Environment;
use path_properties::tree::PropertyTree;

use super::EnvArgs;

/// List the buildable or testable files under a directory
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Root of the source tree.
    #[arg(value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    #[command(flatten)]
    pub env: EnvArgs,

    /// List files that would be run as tests instead of built.
    #[arg(long)]
    pub tested: bool,

    /// Require built files to produce a linkable executable.
    #[arg(long, conflicts_with = "tested")]
    pub link: bool,

    /// Filter files by glob pattern (e.g., "userland/c/*", "**/*.S").
    #[arg(short, long, value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Show only the total count of files.
    #[arg(long)]
    pub count: bool,
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs, tree: &PropertyTree) -> Result<()> {
    let env = args.env.environment()?;
    let pattern = args
        .pattern
        .as_deref()
        .map(|p| {
            glob::Pattern::new(p).map_err(|e| anyhow::anyhow!("Invalid glob pattern '{}': {}", p, e))
        })
        .transpose()?;

    let files = source_files(&args.root)?;
    let selected = select(tree, &env, files, pattern.as_ref(), args.tested, args.link);

    if args.count {
        println!("{}", selected.len());
        return Ok(());
    }
    for path in &selected {
        println!("{path}");
    }
    Ok(())
}

/// Every regular file under `root`, as `/`-joined relative paths in name order.
fn source_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        files.push(segments.join("/"));
    }
    Ok(files)
}

fn select(
    tree: &PropertyTree,
    env: &Environment,
    files: Vec<String>,
    pattern: Option<&glob::Pattern>,
    tested: bool,
    link: bool,
) -> Vec<String> {
    files
        .into_par_iter()
        .filter(|path| pattern.is_none_or(|p| p.matches(path)))
        .filter(|path| {
            let resolved = tree.resolve(path);
            if tested {
                resolved.should_be_tested(env)
            } else {
                resolved.should_be_built(env, link)
            }
        })
        .collect()
}
