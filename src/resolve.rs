//! # Resolution
//!
//! Resolving a path walks the override tree from the root, merging the
//! overrides of every node the path passes through into a running
//! [`PropertySet`] that starts from the schema defaults.
//!
//! The walk is a prefix match: it stops at the first segment with no matching
//! child and returns what was accumulated so far. A path that the tree does
//! not mention at all resolves to the defaults (plus whatever the root node
//! declares). Resolution never fails.

use log::debug;
use serde::Serialize;
use std::path::{Path, MAIN_SEPARATOR};

use crate::merge::{merge_into, PropertySet};
use crate::outcome::ExpectedOutcome;
use crate::schema::{ArchSet, Property, PropertyValue, RunArg};
use crate::signal::Signal;
use crate::tree::PropertyTree;

/// The fully merged properties of one path.
///
/// Owns all of its data; nothing is shared with the tree it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProperties {
    path: Vec<String>,
    properties: PropertySet,
}

impl PropertyTree {
    /// Resolve a filesystem-style path such as `userland/c/exit1.c`.
    ///
    /// The path is split on separators as written. Empty pieces and `.` are
    /// skipped. `..` stays a literal segment: no node is named `..`, so the
    /// walk stops there instead of jumping to a sibling subtree.
    pub fn resolve(&self, path: impl AsRef<Path>) -> ResolvedProperties {
        let path = path.as_ref().to_string_lossy();
        let segments: Vec<&str> = path
            .split(['/', MAIN_SEPARATOR])
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect();
        self.resolve_segments(segments)
    }

    /// Resolve a path given as its segments.
    pub fn resolve_segments<I, S>(&self, segments: I) -> ResolvedProperties
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path: Vec<String> = segments.into_iter().map(Into::into).collect();

        let mut node = self.root();
        let mut properties = PropertySet::defaults();
        merge_into(&mut properties, node.overrides());

        let mut matched = 0;
        for segment in &path {
            match node.child(segment) {
                Some(child) => {
                    node = child;
                    merge_into(&mut properties, node.overrides());
                    matched += 1;
                }
                None => break,
            }
        }
        debug!(
            "resolved {} ({} of {} segments matched)",
            path.join("/"),
            matched,
            path.len()
        );

        ResolvedProperties { path, properties }
    }
}

impl ResolvedProperties {
    /// Wrap an already merged set, e.g. one built by hand in a test driver.
    pub fn new<I, S>(path: I, properties: PropertySet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            properties,
        }
    }

    /// The path segments this set was resolved for.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Extension of the last path segment including the dot, or `""`.
    ///
    /// Leading dots do not start an extension, so `.gitignore` has none.
    pub fn extension(&self) -> &str {
        let Some(name) = self.path.last() else {
            return "";
        };
        let stem_start = name.len() - name.trim_start_matches('.').len();
        match name[stem_start..].rfind('.') {
            Some(dot) => &name[stem_start + dot..],
            None => "",
        }
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn get(&self, property: Property) -> &PropertyValue {
        self.properties.get(property)
    }

    /// Value of a boolean property.
    pub fn flag(&self, property: Property) -> bool {
        matches!(self.get(property), PropertyValue::Bool(true))
    }

    pub fn allowed_archs(&self) -> Option<&ArchSet> {
        match self.get(Property::AllowedArchs) {
            PropertyValue::Archs(archs) => archs.as_ref(),
            _ => None,
        }
    }

    pub fn signal_received(&self) -> Option<Signal> {
        match self.get(Property::SignalReceived) {
            PropertyValue::Signal(signal) => *signal,
            _ => None,
        }
    }

    pub fn exit_status(&self) -> i64 {
        match self.get(Property::ExitStatus) {
            PropertyValue::Integer(status) => *status,
            _ => 0,
        }
    }

    pub fn text(&self, property: Property) -> &str {
        match self.get(property) {
            PropertyValue::Text(text) => text,
            _ => "",
        }
    }

    /// Entries of a list property, e.g. `cc_flags`.
    pub fn list(&self, property: Property) -> &[String] {
        match self.get(property) {
            PropertyValue::List(items) => items,
            _ => &[],
        }
    }

    /// `test_run_args` as `(name, value)` pairs in name order.
    pub fn test_run_args(&self) -> impl Iterator<Item = (&str, &RunArg)> {
        let args = match self.get(Property::TestRunArgs) {
            PropertyValue::Map(args) => Some(args),
            _ => None,
        };
        args.into_iter()
            .flat_map(|args| args.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// What a successful run of this path looks like.
    pub fn expected_outcome(&self) -> ExpectedOutcome {
        ExpectedOutcome {
            exit_status: self.exit_status(),
            signal: self.signal_received(),
        }
    }
}
