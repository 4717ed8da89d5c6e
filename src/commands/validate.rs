//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which builds a
//! declaration file the same way every other command does and reports whether
//! it is usable.
//!
//! ## Functionality
//!
//! - **Structure**: Every node must be a leaf record or a branch with
//!   `properties`/`children`.
//! - **Schema**: Every property name must exist and every value must have the
//!   property's kind. Misspelled names get a suggestion.
//! - **Segments**: A segment may appear only once under the same parent.
//! - **Summary**: Reports node count and how often each property is set.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use path_properties::builtin;
use path_properties::output::{Marker, OutputConfig};
use path_properties::schema::Property;
use path_properties::tree::{OverrideNode, PropertyTree};

/// Validate a declaration file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Declaration file to validate. Defaults to `--properties`, or the
    /// built-in declaration when neither is given.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Show how often each property is set.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, declaration: Option<&Path>, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let file = args.file.as_deref().or(declaration);
    let name = file.map_or_else(|| "(built-in)".to_string(), |f| f.display().to_string());
    println!("{} Validating declaration: {}", out.marker(Marker::Scan), name);

    let built = match file {
        Some(path) => PropertyTree::from_file(path),
        None => builtin::tree(),
    };
    let tree = match built {
        Ok(tree) => tree,
        Err(e) => {
            println!("{} {}", out.marker(Marker::Invalid), e);
            return Err(anyhow::anyhow!("Declaration is invalid: {}", name));
        }
    };

    println!("{} Declaration is valid", out.marker(Marker::Valid));
    println!("   Nodes: {}", tree.node_count());
    let usage = property_usage(tree.root());
    println!("   Properties used: {} of {}", usage.len(), Property::ALL.len());
    if args.verbose {
        for (property, count) in &usage {
            println!("   {:<40} {}", out.key(property.as_str()), count);
        }
    }
    Ok(())
}

/// How many nodes set each property.
fn property_usage(root: &OverrideNode) -> BTreeMap<Property, usize> {
    let mut usage = BTreeMap::new();
    let mut todo = vec![root];
    while let Some(node) = todo.pop() {
        for (property, _) in node.overrides().iter() {
            *usage.entry(property).or_insert(0) += 1;
        }
        todo.extend(node.children().map(|(_, child)| child));
    }
    usage
}
