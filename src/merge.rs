//! # Property Merging
//!
//! Resolution folds the override records of every matched node, root first,
//! into a complete [`PropertySet`]. Each step combines the inherited set (the
//! "base") with one more specific record (the "delta"), dispatching on the
//! property's [`MergeStrategy`]:
//!
//! - `Overwrite`: the delta's value replaces the base's.
//! - `Concatenate`: the delta's entries are appended after the base's, so
//!   compiler flags accumulate from the root down in declaration order.
//! - `ShallowMerge`: keyed union, the delta wins on a shared key.
//!
//! Properties the delta does not set are left untouched. Merges must run in
//! root-to-leaf order; running them in any other order changes both flag
//! order and overwrite precedence.

use log::trace;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::overrides::Overrides;
use crate::schema::{MergeStrategy, Property, PropertyValue};

/// A value for every schema property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropertySet {
    values: BTreeMap<Property, PropertyValue>,
}

impl PropertySet {
    /// The schema defaults.
    pub fn defaults() -> Self {
        Self {
            values: Property::ALL
                .into_iter()
                .map(|property| (property, property.default_value()))
                .collect(),
        }
    }

    pub fn get(&self, property: Property) -> &PropertyValue {
        // Every property is present: the set starts from the full defaults and
        // merging never removes an entry.
        &self.values[&property]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &PropertyValue)> {
        self.values.iter().map(|(p, v)| (*p, v))
    }
}

impl Default for PropertySet {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Merge `delta` into `base` in place.
pub fn merge_into(base: &mut PropertySet, delta: &Overrides) {
    for (property, value) in delta.iter() {
        let strategy = property.merge_strategy();
        trace!("merging {property} ({strategy:?})");
        // A set always holds every property, so the lookup cannot miss.
        if let Some(current) = base.values.get_mut(&property) {
            merge_value(current, value, strategy);
        }
    }
}

/// Merge `delta` into a copy of `base`.
pub fn merge(base: &PropertySet, delta: &Overrides) -> PropertySet {
    let mut merged = base.clone();
    merge_into(&mut merged, delta);
    merged
}

fn merge_value(current: &mut PropertyValue, delta: &PropertyValue, strategy: MergeStrategy) {
    match (strategy, current, delta) {
        (MergeStrategy::Concatenate, PropertyValue::List(base), PropertyValue::List(more)) => {
            base.extend(more.iter().cloned());
        }
        (MergeStrategy::ShallowMerge, PropertyValue::Map(base), PropertyValue::Map(more)) => {
            base.extend(more.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        (_, current, delta) => *current = delta.clone(),
    }
}
