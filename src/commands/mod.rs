//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `path-properties` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic.
//!
//! Commands that need an override tree receive it already built; the tree is
//! loaded once per invocation by [`load_tree`].

pub mod check;
pub mod completions;
pub mod ls;
pub mod resolve;
pub mod tree;
pub mod validate;

use anyhow::{Context, Result};
use clap::Args;
use log::debug;
use std::path::{Path, PathBuf};

use path_properties::builtin;
use path_properties::env::{BuildMode, Emulator, Environment};
use path_properties::tree::PropertyTree;

/// Build the override tree from `path`, or the built-in declaration.
pub fn load_tree(path: Option<&Path>) -> Result<PropertyTree> {
    let tree = match path {
        Some(path) => PropertyTree::from_file(path)
            .with_context(|| format!("Failed to load declaration from {}", path.display()))?,
        None => builtin::tree().context("Failed to load the built-in declaration")?,
    };
    debug!("override tree has {} nodes", tree.node_count());
    Ok(tree)
}

/// Flags describing the build/test environment.
///
/// Flags given on the command line override the fields of `--env-file`.
#[derive(Args, Debug, Clone, Default)]
pub struct EnvArgs {
    /// Environment file (YAML) to start from.
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Target architecture, e.g. x86_64, arm, aarch64.
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Build mode.
    #[arg(long, value_enum)]
    pub mode: Option<BuildMode>,

    /// Emulator used for test runs.
    #[arg(long, value_enum)]
    pub emulator: Option<Emulator>,

    /// Select an optional library package (repeatable).
    #[arg(long = "package", value_name = "NAME")]
    pub packages: Vec<String>,

    /// Select every optional library package.
    #[arg(long)]
    pub package_all: bool,
}

impl EnvArgs {
    pub fn environment(&self) -> Result<Environment> {
        let mut env = match &self.env_file {
            Some(path) => Environment::from_file(path).with_context(|| {
                format!("Failed to load environment from {}", path.display())
            })?,
            None => Environment::default(),
        };
        if let Some(arch) = &self.arch {
            env.arch = arch.clone();
        }
        if let Some(mode) = self.mode {
            env.mode = mode;
        }
        if let Some(emulator) = self.emulator {
            env.emulator = emulator;
        }
        env.package.extend(self.packages.iter().cloned());
        env.package_all |= self.package_all;
        debug!("environment: {:?}", env);
        Ok(env)
    }
}
