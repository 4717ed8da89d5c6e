//! # Error Handling
//!
//! This module defines the error type shared by the whole library. It uses
//! `thiserror` to derive descriptive messages for every failure mode.
//!
//! Almost every failure here is a *definition-time* failure: a declaration
//! names a property the schema does not know, gives a property a value of the
//! wrong shape, or declares the same child segment twice. These are defects in
//! the declaration data and are never retried. Resolution and the eligibility
//! predicates have no error path at all.
//!
//! The remaining variants wrap the I/O and parsing errors that can occur while
//! loading declaration or environment files.

use thiserror::Error;

/// Main error type for path-properties operations
#[derive(Error, Debug)]
pub enum Error {
    /// An override record named a property that is not part of the schema.
    ///
    /// Includes a "did you mean" hint when the key is close to a known
    /// property name.
    #[error("Unknown property: {key}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    UnknownProperty {
        key: String,
        /// Optional suggestion for the intended property name
        hint: Option<String>,
    },

    /// A known property was given a value of the wrong kind.
    #[error("Invalid value for property {property}: {message}")]
    InvalidValue { property: String, message: String },

    /// The same child segment was declared twice under one parent node.
    #[error("Duplicate segment '{segment}' under '{parent}'")]
    DuplicateSegment { parent: String, segment: String },

    /// A declaration or environment file has a structurally invalid layout.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
