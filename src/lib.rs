//! # Path Properties Library
//!
//! This library answers two questions for every file of a multi-architecture
//! example tree: should it be built in the current environment, and should
//! the built artifact be run as a test. It also says how such a test is
//! expected to end (exit status or signal) and which extra compiler flags
//! and run arguments apply.
//!
//! ## Quick Example
//!
//! ```
//! use path_properties::env::{BuildMode, Emulator, Environment};
//! use path_properties::schema::Property;
//! use path_properties::tree::PropertyTree;
//!
//! let tree = PropertyTree::from_yaml_str(r#"
//! children:
//!   userland:
//!     properties: { userland: true }
//!     children:
//!       c:
//!         children:
//!           exit1.c: { exit_status: 1 }
//!           sleep.c: { more_than_1s: true }
//! "#).unwrap();
//!
//! let env = Environment::new("x86_64", BuildMode::Userland, Emulator::Qemu);
//!
//! let exit1 = tree.resolve("userland/c/exit1.c");
//! assert_eq!(exit1.exit_status(), 1);
//! assert!(exit1.should_be_tested(&env));
//!
//! let sleep = tree.resolve("userland/c/sleep.c");
//! assert!(sleep.flag(Property::MoreThan1s));
//! assert!(sleep.should_be_built(&env, true));
//! assert!(!sleep.should_be_tested(&env));
//! ```
//!
//! ## Core Concepts
//!
//! - **Schema (`schema`)**: The closed set of properties, their value kinds,
//!   defaults and merge strategies.
//! - **Overrides (`overrides`)**: A validated partial property record attached
//!   to one path segment.
//! - **Override tree (`tree`)**: The immutable prefix tree built once from a
//!   nested declaration.
//! - **Merge (`merge`)**: Folds one override record into a running property
//!   set, per property strategy.
//! - **Resolution (`resolve`)**: Walks the tree along a path and returns the
//!   merged [`resolve::ResolvedProperties`].
//! - **Eligibility (`eligibility`)**: The build and test predicates, evaluated
//!   against an [`env::Environment`].
//!
//! A tree is built once (for instance with [`builtin::tree`]) and passed
//! explicitly to whoever resolves paths. There is no global state, and a
//! built tree may be shared across threads.

pub mod builtin;
pub mod eligibility;
pub mod env;
pub mod error;
pub mod merge;
pub mod outcome;
pub mod output;
pub mod overrides;
pub mod resolve;
pub mod schema;
pub mod signal;
pub mod suggestions;
pub mod tree;

#[cfg(test)]
mod resolve_proptest;
