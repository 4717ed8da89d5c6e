//! Sparse override records.
//!
//! An [`Overrides`] holds only the properties one declaration node sets
//! explicitly. Every key is a schema [`Property`] and every value has been
//! checked against that property's kind, so a record that exists is valid.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::schema::{Property, PropertyValue};

/// The properties set explicitly at one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Overrides {
    values: BTreeMap<Property, PropertyValue>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(name, value)` pairs, failing on the first name
    /// outside the schema or value of the wrong kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use path_properties::overrides::Overrides;
    /// use path_properties::schema::PropertyValue;
    ///
    /// let overrides = Overrides::from_pairs([("exit_status", PropertyValue::from(1))]).unwrap();
    /// assert_eq!(overrides.len(), 1);
    ///
    /// assert!(Overrides::from_pairs([("exit_code", PropertyValue::from(1))]).is_err());
    /// ```
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, PropertyValue)>,
        K: AsRef<str>,
    {
        let mut overrides = Self::new();
        for (key, value) in pairs {
            let property: Property = key.as_ref().parse()?;
            overrides.insert(property, value)?;
        }
        Ok(overrides)
    }

    /// Build a record from a YAML mapping of property names to values.
    pub fn from_yaml(mapping: &serde_yaml::Mapping) -> Result<Self> {
        let mut overrides = Self::new();
        for (key, value) in mapping {
            let key = key.as_str().ok_or_else(|| Error::ConfigParse {
                message: format!("property names must be strings, found {key:?}"),
                hint: None,
            })?;
            let property: Property = key.parse()?;
            overrides.insert(property, PropertyValue::from_yaml(property, value)?)?;
        }
        Ok(overrides)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, property: Property, value: impl Into<PropertyValue>) -> Result<Self> {
        self.insert(property, value.into())?;
        Ok(self)
    }

    /// Set `property`, replacing any previous value in this record.
    pub fn insert(&mut self, property: Property, value: PropertyValue) -> Result<()> {
        if value.kind() != property.kind() {
            return Err(Error::InvalidValue {
                property: property.to_string(),
                message: format!("expected {}, found {:?}", property.kind(), value),
            });
        }
        self.values.insert(property, value);
        Ok(())
    }

    pub fn get(&self, property: Property) -> Option<&PropertyValue> {
        self.values.get(&property)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &PropertyValue)> {
        self.values.iter().map(|(p, v)| (*p, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
