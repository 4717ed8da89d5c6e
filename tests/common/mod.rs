//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_declaration(declarations::SMALL);
//!     fixture.command().args(["resolve", "userland/c/exit1.c"]).assert().success();
//! }
//! ```

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use super::declarations;
    pub use super::{command, TestFixture};
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;
}

/// Declaration YAML snippets for testing.
#[allow(dead_code)]
pub mod declarations {
    /// A small tree with one C directory.
    pub const SMALL: &str = r#"
children:
  userland:
    properties:
      userland: true
    children:
      c:
        properties:
          baremetal: true
        children:
          exit1.c: { exit_status: 1 }
          sleep.c: { more_than_1s: true }
          broken.c: { no_build: true }
          abort.c: { signal_received: SIGABRT }
"#;

    /// A misspelled property name.
    pub const MISSPELLED: &str = r#"
children:
  userland:
    properties:
      userlnd: true
"#;

    /// The same segment twice under one parent.
    pub const DUPLICATE: &str = r#"
children:
  userland:
    children:
      c: { exit_status: 1 }
      c: { exit_status: 2 }
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "children: [unclosed";
}

/// A command for the binary with the declaration env var cleared.
pub fn command() -> Command {
    let mut cmd = cargo_bin_cmd!("path-properties");
    cmd.env_remove("PATH_PROPERTIES_FILE");
    cmd.arg("--color").arg("never");
    cmd
}

/// A temporary directory holding an optional declaration and source files.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `properties.yaml` with the given content.
    pub fn with_declaration(self, content: &str) -> Self {
        self.with_file("properties.yaml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn declaration_path(&self) -> PathBuf {
        self.temp_dir.path().join("properties.yaml")
    }

    /// A command that uses this fixture's declaration.
    pub fn command(&self) -> Command {
        let mut cmd = command();
        cmd.current_dir(self.path())
            .arg("--properties")
            .arg(self.declaration_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
