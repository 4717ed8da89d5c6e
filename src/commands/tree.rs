//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays the override
//! tree of a declaration, one line per path segment with the overrides that
//! segment sets.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::path::Path;

use path_properties::tree::{OverrideNode, PropertyTree};

/// Display the declaration tree
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Maximum depth to display in the tree.
    ///
    /// If not specified, displays the full tree.
    /// Use 0 to show only the root, 1 to show its direct children, etc.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,

    /// Hide the overrides and show segment names only.
    #[arg(long)]
    pub names_only: bool,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs, declaration: Option<&Path>) -> Result<()> {
    let tree = super::load_tree(declaration)?;
    let root_label = match declaration {
        Some(path) => path.display().to_string(),
        None => "(built-in)".to_string(),
    };

    let root = build_tree_node(
        root_label,
        tree.root(),
        args.depth.unwrap_or(usize::MAX),
        0,
        args.names_only,
    );
    print_tree(&root).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;
    Ok(())
}

fn build_tree_node(
    segment: String,
    node: &OverrideNode,
    max_depth: usize,
    current_depth: usize,
    names_only: bool,
) -> TreeNode {
    let label = if names_only || node.overrides().is_empty() {
        segment
    } else {
        let overrides: Vec<String> = node
            .overrides()
            .iter()
            .map(|(property, value)| format!("{property}={value}"))
            .collect();
        format!("{segment}  {}", overrides.join(" "))
    };

    let children = if current_depth >= max_depth {
        vec![]
    } else {
        node.children()
            .map(|(child_segment, child)| {
                build_tree_node(
                    child_segment.to_string(),
                    child,
                    max_depth,
                    current_depth + 1,
                    names_only,
                )
            })
            .collect()
    };
    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}
