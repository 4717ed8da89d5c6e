//! # Build Environment
//!
//! The environment descriptor supplied by the build driver on every
//! eligibility query: which architecture is targeted, whether the build is
//! hosted or freestanding, which emulator will run the tests, which file
//! extensions each mode can build, and which optional library packages were
//! selected.
//!
//! The descriptor never influences resolution, only the eligibility
//! predicates. It can be loaded from a YAML file; every field is optional and
//! falls back to the defaults below.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Architecture assumed when none is configured.
pub const DEFAULT_ARCH: &str = "x86_64";

/// Extensions a hosted build compiles.
pub const DEFAULT_HOSTED_EXTS: &[&str] = &[".c", ".cpp", ".S"];

/// Extensions a freestanding build compiles.
pub const DEFAULT_FREESTANDING_EXTS: &[&str] = &[".c", ".S"];

/// Whether the target runs under an operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Hosted: a full OS, programs are ordinary userland executables.
    #[default]
    Userland,
    /// Freestanding: no OS, programs run on the bare machine.
    Baremetal,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Userland => f.write_str("userland"),
            BuildMode::Baremetal => f.write_str("baremetal"),
        }
    }
}

/// The back-end that executes test artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Emulator {
    /// Fast functional emulator.
    #[default]
    Qemu,
    /// Cycle-accurate emulator. Narrower instruction coverage and no
    /// reliable signal reporting.
    Gem5,
}

impl fmt::Display for Emulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emulator::Qemu => f.write_str("qemu"),
            Emulator::Gem5 => f.write_str("gem5"),
        }
    }
}

/// The current build/test context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Environment {
    pub arch: String,
    pub mode: BuildMode,
    pub emulator: Emulator,
    /// Extensions (with the leading dot) buildable in userland mode.
    pub build_in_exts: BTreeSet<String>,
    /// Extensions (with the leading dot) buildable in baremetal mode.
    pub baremetal_build_in_exts: BTreeSet<String>,
    /// Selected optional library packages.
    pub package: BTreeSet<String>,
    /// Select every optional library package.
    pub package_all: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            arch: DEFAULT_ARCH.to_string(),
            mode: BuildMode::default(),
            emulator: Emulator::default(),
            build_in_exts: DEFAULT_HOSTED_EXTS.iter().map(|s| s.to_string()).collect(),
            baremetal_build_in_exts: DEFAULT_FREESTANDING_EXTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            package: BTreeSet::new(),
            package_all: false,
        }
    }
}

impl Environment {
    pub fn new(arch: impl Into<String>, mode: BuildMode, emulator: Emulator) -> Self {
        Self {
            arch: arch.into(),
            mode,
            emulator,
            ..Self::default()
        }
    }

    /// Parse an environment from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read and parse an environment file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn with_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.package.extend(packages.into_iter().map(Into::into));
        self
    }

    /// The extension whitelist for the current mode.
    pub fn build_exts(&self) -> &BTreeSet<String> {
        match self.mode {
            BuildMode::Userland => &self.build_in_exts,
            BuildMode::Baremetal => &self.baremetal_build_in_exts,
        }
    }

    pub fn is_baremetal(&self) -> bool {
        self.mode == BuildMode::Baremetal
    }
}
