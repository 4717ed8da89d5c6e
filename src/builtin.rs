//! The declaration shipped with the binary.
//!
//! Used whenever no `--properties` file is given.

use crate::error::Result;
use crate::tree::PropertyTree;

/// Raw YAML of the built-in declaration.
pub const DECLARATION: &str = include_str!("../data/path_properties.yaml");

/// Build the override tree from the built-in declaration.
pub fn tree() -> Result<PropertyTree> {
    PropertyTree::from_yaml_str(DECLARATION)
}
