//! # Override Tree
//!
//! Declarations are written as a nested structure keyed by path segment. Each
//! entry is either a plain override record (a leaf) or a pair of an override
//! record and a mapping of child segments (a branch). [`PropertyTree::build`]
//! turns that structure into an immutable tree of [`OverrideNode`]s, checking
//! every record against the schema on the way.
//!
//! The tree is built once and then only read. It owns all of its data and is
//! `Send + Sync`, so one tree can serve lookups from any number of threads
//! once the build has returned.
//!
//! ## YAML layout
//!
//! A mapping whose keys are only `properties` and/or `children` is a branch;
//! any other mapping is a leaf override record:
//!
//! ```yaml
//! children:
//!   userland:
//!     properties: { userland: true }
//!     children:
//!       c:
//!         properties: { baremetal: true }
//!         children:
//!           exit1.c: { exit_status: 1 }
//! ```

use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::overrides::Overrides;

const PROPERTIES_KEY: &str = "properties";
const CHILDREN_KEY: &str = "children";
const TREE_KEY: &str = "tree";
const SHARED_KEY: &str = "shared";

/// One entry of the nested declaration structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// Overrides with no children.
    Leaf(Overrides),
    /// Overrides plus child segments, in declaration order.
    Branch(Overrides, Vec<(String, Declaration)>),
}

impl Declaration {
    pub fn leaf(overrides: Overrides) -> Self {
        Declaration::Leaf(overrides)
    }

    pub fn branch<I, S>(overrides: Overrides, children: I) -> Self
    where
        I: IntoIterator<Item = (S, Declaration)>,
        S: Into<String>,
    {
        Declaration::Branch(
            overrides,
            children.into_iter().map(|(s, d)| (s.into(), d)).collect(),
        )
    }

    /// Parse a declaration from YAML text.
    ///
    /// The document is either the root node itself, or a mapping with the
    /// root node under `tree` and anchors for reuse under `shared`.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        let root = match value.as_mapping().and_then(|m| m.get(TREE_KEY).map(|t| (m, t))) {
            Some((document, tree)) => {
                if let Some(key) = document
                    .keys()
                    .find(|k| !matches!(k.as_str(), Some(TREE_KEY) | Some(SHARED_KEY)))
                {
                    return Err(Error::ConfigParse {
                        message: format!("unexpected top-level key {key:?} next to 'tree'"),
                        hint: Some("Only 'tree' and 'shared' may appear at the top level".to_string()),
                    });
                }
                tree
            }
            None => &value,
        };
        Self::from_yaml(root, "")
    }

    fn from_yaml(value: &serde_yaml::Value, path: &str) -> Result<Self> {
        use serde_yaml::Value;

        let mapping = match value {
            Value::Null => return Ok(Declaration::Leaf(Overrides::new())),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(Error::ConfigParse {
                    message: format!("entry {} must be a mapping", display_path(path)),
                    hint: Some("Use a mapping of property names to values".to_string()),
                })
            }
        };

        let is_branch = !mapping.is_empty()
            && mapping
                .keys()
                .all(|k| matches!(k.as_str(), Some(PROPERTIES_KEY) | Some(CHILDREN_KEY)));
        if !is_branch {
            return Ok(Declaration::Leaf(Overrides::from_yaml(mapping)?));
        }

        let overrides = match mapping.get(PROPERTIES_KEY) {
            None | Some(Value::Null) => Overrides::new(),
            Some(Value::Mapping(properties)) => Overrides::from_yaml(properties)?,
            Some(_) => {
                return Err(Error::ConfigParse {
                    message: format!("'properties' of {} must be a mapping", display_path(path)),
                    hint: None,
                })
            }
        };

        let mut children = Vec::new();
        match mapping.get(CHILDREN_KEY) {
            None | Some(Value::Null) => {}
            Some(Value::Mapping(entries)) => {
                for (segment, child) in entries {
                    let segment = segment.as_str().ok_or_else(|| Error::ConfigParse {
                        message: format!(
                            "child segment names under {} must be strings",
                            display_path(path)
                        ),
                        hint: None,
                    })?;
                    let child_path = join_path(path, segment);
                    children.push((segment.to_string(), Self::from_yaml(child, &child_path)?));
                }
            }
            Some(_) => {
                return Err(Error::ConfigParse {
                    message: format!("'children' of {} must be a mapping", display_path(path)),
                    hint: Some("Use 'segment: {...}' entries".to_string()),
                })
            }
        }

        Ok(Declaration::Branch(overrides, children))
    }
}

/// One node of the built tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideNode {
    overrides: Overrides,
    children: BTreeMap<String, OverrideNode>,
}

impl OverrideNode {
    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn child(&self, segment: &str) -> Option<&OverrideNode> {
        self.children.get(segment)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &OverrideNode)> {
        self.children.iter().map(|(s, n)| (s.as_str(), n))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut todo = vec![self];
        while let Some(node) = todo.pop() {
            count += 1;
            todo.extend(node.children.values());
        }
        count
    }
}

// The derived drop would recurse once per level; unlink children onto a
// work-list so every node is dropped with no children left.
impl Drop for OverrideNode {
    fn drop(&mut self) {
        let mut todo: Vec<OverrideNode> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = todo.pop() {
            todo.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}

/// The immutable override tree for a whole source tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyTree {
    root: OverrideNode,
}

/// A node under construction during [`PropertyTree::build`].
struct Frame {
    segment: String,
    path: String,
    overrides: Overrides,
    pending: std::vec::IntoIter<(String, Declaration)>,
    children: BTreeMap<String, OverrideNode>,
}

impl Frame {
    fn new(segment: String, path: String, declaration: Declaration) -> Self {
        let (overrides, pending) = match declaration {
            Declaration::Leaf(overrides) => (overrides, Vec::new()),
            Declaration::Branch(overrides, children) => {
                if children.is_empty() {
                    warn!("{} declares an empty children mapping", display_path(&path));
                }
                (overrides, children)
            }
        };
        Self {
            segment,
            path,
            overrides,
            pending: pending.into_iter(),
            children: BTreeMap::new(),
        }
    }

    fn finish(self) -> (String, OverrideNode) {
        (
            self.segment,
            OverrideNode {
                overrides: self.overrides,
                children: self.children,
            },
        )
    }
}

impl PropertyTree {
    /// Build the tree from a declaration.
    ///
    /// Walks the declaration with an explicit work-list, so arbitrarily deep
    /// declarations do not grow the call stack. Fails if two children of one
    /// node share a segment name.
    pub fn build(declaration: Declaration) -> Result<Self> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut current = Frame::new(String::new(), String::new(), declaration);

        loop {
            if let Some((segment, child)) = current.pending.next() {
                if current.children.contains_key(&segment) {
                    return Err(Error::DuplicateSegment {
                        parent: display_path(&current.path),
                        segment,
                    });
                }
                let path = join_path(&current.path, &segment);
                let frame = Frame::new(segment, path, child);
                stack.push(std::mem::replace(&mut current, frame));
                continue;
            }

            let (segment, node) = current.finish();
            match stack.pop() {
                Some(parent) => {
                    current = parent;
                    current.children.insert(segment, node);
                }
                None => {
                    let tree = PropertyTree { root: node };
                    debug!("built property tree with {} nodes", tree.node_count());
                    return Ok(tree);
                }
            }
        }
    }

    /// Parse and build a tree from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::build(Declaration::from_yaml_str(content)?)
    }

    /// Read, parse and build a tree from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        debug!("loading declaration from {}", path.display());
        Self::from_yaml_str(&content)
    }

    pub fn root(&self) -> &OverrideNode {
        &self.root
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}

fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}/{segment}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Property, PropertyValue};

    fn flag(property: Property) -> Overrides {
        Overrides::new().with(property, true).unwrap()
    }

    #[test]
    fn test_build_wires_children() {
        let tree = PropertyTree::build(Declaration::branch(
            Overrides::new(),
            [
                (
                    "userland",
                    Declaration::branch(
                        flag(Property::Userland),
                        [("getchar.c", Declaration::leaf(flag(Property::Interactive)))],
                    ),
                ),
                ("lkmc.c", Declaration::leaf(flag(Property::Baremetal))),
            ],
        ))
        .unwrap();

        assert_eq!(tree.node_count(), 4);
        let userland = tree.root().child("userland").unwrap();
        assert_eq!(
            userland.overrides().get(Property::Userland),
            Some(&PropertyValue::Bool(true))
        );
        let getchar = userland.child("getchar.c").unwrap();
        assert!(getchar.is_leaf());
        assert!(tree.root().child("missing").is_none());
    }

    #[test]
    fn test_duplicate_segment_is_rejected() {
        let err = PropertyTree::build(Declaration::branch(
            Overrides::new(),
            [(
                "linux",
                Declaration::branch(
                    Overrides::new(),
                    [
                        ("proc_events.c", Declaration::leaf(flag(Property::RequiresSudo))),
                        ("proc_events.c", Declaration::leaf(flag(Property::RequiresSudo))),
                    ],
                ),
            )],
        ))
        .unwrap_err();

        match err {
            Error::DuplicateSegment { parent, segment } => {
                assert_eq!(parent, "linux");
                assert_eq!(segment, "proc_events.c");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_same_name_under_different_parents_is_fine() {
        let tree = PropertyTree::build(Declaration::branch(
            Overrides::new(),
            [
                (
                    "arm",
                    Declaration::branch(Overrides::new(), [("udf.S", Declaration::leaf(Overrides::new()))]),
                ),
                (
                    "aarch64",
                    Declaration::branch(Overrides::new(), [("udf.S", Declaration::leaf(Overrides::new()))]),
                ),
            ],
        ))
        .unwrap();
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_deep_declaration_does_not_recurse() {
        let mut declaration = Declaration::leaf(flag(Property::NoBuild));
        for depth in 0..10_000 {
            declaration = Declaration::branch(Overrides::new(), [(format!("d{depth}"), declaration)]);
        }
        let tree = PropertyTree::build(declaration).unwrap();
        assert_eq!(tree.node_count(), 10_001);
        drop(tree);
    }

    #[test]
    fn test_deep_tree_lookup_then_drop() {
        let mut declaration = Declaration::leaf(Overrides::new());
        for depth in 0..10_000 {
            declaration = Declaration::branch(Overrides::new(), [(format!("d{depth}"), declaration)]);
        }
        let tree = PropertyTree::build(declaration).unwrap();
        let subtree = tree.root().child("d9999").unwrap().child("d9998").unwrap().node_count();
        drop(tree);
        assert_eq!(subtree, 9_999);
    }

    #[test]
    fn test_from_yaml_branch_and_leaf() {
        let tree = PropertyTree::from_yaml_str(
            r#"
children:
  userland:
    properties:
      userland: true
    children:
      c:
        properties: { baremetal: true }
        children:
          exit1.c: { exit_status: 1 }
          empty.c:
  lkmc.c:
    baremetal: true
    userland: true
"#,
        )
        .unwrap();

        let c = tree.root().child("userland").unwrap().child("c").unwrap();
        assert_eq!(
            c.child("exit1.c").unwrap().overrides().get(Property::ExitStatus),
            Some(&PropertyValue::Integer(1))
        );
        assert!(c.child("empty.c").unwrap().overrides().is_empty());
        assert_eq!(tree.root().child("lkmc.c").unwrap().overrides().len(), 2);
    }

    #[test]
    fn test_from_yaml_unknown_property_fails() {
        let err = PropertyTree::from_yaml_str(
            r#"
children:
  userland:
    properties: { userlnd: true }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownProperty { ref key, .. } if key == "userlnd"));
    }

    #[test]
    fn test_from_yaml_mixed_mapping_is_a_leaf_and_fails() {
        // `children` next to a property is not a branch, so `children` is an unknown property
        let err = PropertyTree::from_yaml_str(
            r#"
children:
  c:
    baremetal: true
    children: {}
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownProperty { ref key, .. } if key == "children"));
    }

    #[test]
    fn test_from_yaml_document_with_shared_anchors() {
        let tree = PropertyTree::from_yaml_str(
            r#"
shared:
  - &gnu { c_std: gnu11, cc_pedantic: false }
tree:
  children:
    gcc:
      properties: *gnu
    linux: *gnu
"#,
        )
        .unwrap();
        let gcc = tree.root().child("gcc").unwrap();
        let linux = tree.root().child("linux").unwrap();
        assert_eq!(gcc.overrides(), linux.overrides());
        assert_eq!(
            gcc.overrides().get(Property::CStd),
            Some(&PropertyValue::Text("gnu11".to_string()))
        );
    }

    #[test]
    fn test_from_yaml_document_rejects_stray_top_level_key() {
        let err = PropertyTree::from_yaml_str("tree: {}
extra: 1
").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_from_yaml_rejects_scalar_node() {
        let err = PropertyTree::from_yaml_str("children:\n  c: 3\n").unwrap_err();
        assert!(err.to_string().contains("entry c must be a mapping"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = PropertyTree::from_file(Path::new("/nonexistent/props.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
