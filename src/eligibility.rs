//! # Eligibility
//!
//! The two verdicts the build driver asks for each path: should it be built
//! under this environment, and should the built artifact be run as a test.
//!
//! Both are flat lists of independent exclusion rules, each one encoding a
//! known emulator, architecture or environment limitation. A path is
//! eligible when no rule fires. [`build_exclusions`] and [`test_exclusions`]
//! report every rule that fired, which is what `check --explain` prints;
//! [`should_be_built`] and [`should_be_tested`] are the plain boolean forms.
//!
//! Testing implies building: every build exclusion (with `link = false`) is
//! also a test exclusion.

use log::trace;
use std::fmt;

use crate::env::{BuildMode, Emulator, Environment};
use crate::resolve::ResolvedProperties;
use crate::schema::Property;

/// Path segment (second level) that holds optional library packages.
pub const LIBRARY_SEGMENT: &str = "libs";

/// Boolean properties that each, on their own, keep a path out of test runs.
const TEST_BLOCKING_FLAGS: [Property; 9] = [
    Property::DisruptsSystem,
    Property::Interactive,
    Property::MoreThan1s,
    Property::NoExecutable,
    Property::RequiresArgument,
    Property::RequiresKernelModules,
    Property::RequiresSudo,
    Property::SkipRunUnclassified,
    Property::QemuX86_64IntSyscall,
];

/// Properties the cycle-accurate emulator cannot run.
const GEM5_BLOCKING_FLAGS: [Property; 4] = [
    Property::Gem5UnimplementedInstruction,
    Property::RequiresDynamicLibrary,
    Property::RequiresSemihosting,
    Property::RequiresSyscallGetcpu,
];

/// Why a path is not built or not tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// An optional library that was not selected.
    PackageNotSelected(String),
    NoBuild,
    ArchNotAllowed(String),
    /// The path is not marked buildable in this mode.
    ModeNotSupported(BuildMode),
    /// The extension is not in this mode's whitelist.
    ExtensionNotBuildable(String),
    /// Linking was requested but the path produces no executable.
    NotLinkable,
    /// Freestanding runs cannot execute aarch32-only instructions.
    FreestandingAarch32,
    /// Freestanding runs do not deliver OS-generated signals.
    FreestandingOsSignal,
    /// A boolean property that always blocks test runs.
    Flag(Property),
    /// A property the cycle-accurate emulator cannot run.
    Gem5Limitation(Property),
    /// The cycle-accurate emulator does not report signals.
    Gem5SignalExpected,
    /// A property the fast functional emulator cannot run.
    QemuLimitation(Property),
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::PackageNotSelected(name) => write!(f, "library package '{name}' not selected"),
            Exclusion::NoBuild => f.write_str("no_build is set"),
            Exclusion::ArchNotAllowed(arch) => write!(f, "architecture {arch} not in allowed_archs"),
            Exclusion::ModeNotSupported(mode) => write!(f, "not buildable in {mode} mode"),
            Exclusion::ExtensionNotBuildable(ext) if ext.is_empty() => {
                f.write_str("no file extension")
            }
            Exclusion::ExtensionNotBuildable(ext) => write!(f, "extension {ext} not buildable"),
            Exclusion::NotLinkable => f.write_str("no_executable is set and linking was requested"),
            Exclusion::FreestandingAarch32 => f.write_str("aarch32 instructions in baremetal mode"),
            Exclusion::FreestandingOsSignal => {
                f.write_str("OS-generated signal expected in baremetal mode")
            }
            Exclusion::Flag(property) => write!(f, "{property} is set"),
            Exclusion::Gem5Limitation(property) => write!(f, "{property} is set under gem5"),
            Exclusion::Gem5SignalExpected => f.write_str("gem5 does not report signals"),
            Exclusion::QemuLimitation(property) => write!(f, "{property} is set under qemu"),
        }
    }
}

/// Every rule that keeps `resolved` from being built.
pub fn build_exclusions(
    resolved: &ResolvedProperties,
    env: &Environment,
    link: bool,
) -> Vec<Exclusion> {
    let mut exclusions = Vec::new();
    let path = resolved.path();

    if path.get(1).is_some_and(|s| s == LIBRARY_SEGMENT) && !env.package_all {
        if let Some(library) = path.get(2) {
            if !env.package.contains(library) {
                exclusions.push(Exclusion::PackageNotSelected(library.clone()));
            }
        }
    }

    if resolved.flag(Property::NoBuild) {
        exclusions.push(Exclusion::NoBuild);
    }

    if let Some(archs) = resolved.allowed_archs() {
        if !archs.contains(&env.arch) {
            exclusions.push(Exclusion::ArchNotAllowed(env.arch.clone()));
        }
    }

    let mode_flag = match env.mode {
        BuildMode::Userland => Property::Userland,
        BuildMode::Baremetal => Property::Baremetal,
    };
    if !resolved.flag(mode_flag) {
        exclusions.push(Exclusion::ModeNotSupported(env.mode));
    }
    let ext = resolved.extension();
    if !env.build_exts().contains(ext) {
        exclusions.push(Exclusion::ExtensionNotBuildable(ext.to_string()));
    }

    if link && resolved.flag(Property::NoExecutable) {
        exclusions.push(Exclusion::NotLinkable);
    }

    if !exclusions.is_empty() {
        trace!("{} not built: {:?}", path.join("/"), exclusions);
    }
    exclusions
}

/// Every rule that keeps `resolved` out of test runs, build rules included.
pub fn test_exclusions(resolved: &ResolvedProperties, env: &Environment) -> Vec<Exclusion> {
    let mut exclusions = build_exclusions(resolved, env, false);

    if env.is_baremetal() {
        if resolved.flag(Property::ArmAarch32) {
            exclusions.push(Exclusion::FreestandingAarch32);
        }
        if resolved.flag(Property::SignalGeneratedByOs) {
            exclusions.push(Exclusion::FreestandingOsSignal);
        }
    }

    exclusions.extend(
        TEST_BLOCKING_FLAGS
            .into_iter()
            .filter(|p| resolved.flag(*p))
            .map(Exclusion::Flag),
    );

    match env.emulator {
        Emulator::Gem5 => {
            exclusions.extend(
                GEM5_BLOCKING_FLAGS
                    .into_iter()
                    .filter(|p| resolved.flag(*p))
                    .map(Exclusion::Gem5Limitation),
            );
            if resolved.signal_received().is_some() {
                exclusions.push(Exclusion::Gem5SignalExpected);
            }
        }
        Emulator::Qemu => {
            if resolved.flag(Property::RequiresM5ops) {
                exclusions.push(Exclusion::QemuLimitation(Property::RequiresM5ops));
            }
            if env.is_baremetal() && resolved.flag(Property::QemuUnimplementedInstruction) {
                exclusions.push(Exclusion::QemuLimitation(
                    Property::QemuUnimplementedInstruction,
                ));
            }
        }
    }

    if !exclusions.is_empty() {
        trace!("{} not tested: {:?}", resolved.path().join("/"), exclusions);
    }
    exclusions
}

/// Whether `resolved` should be compiled, and linked if `link` is set.
pub fn should_be_built(resolved: &ResolvedProperties, env: &Environment, link: bool) -> bool {
    build_exclusions(resolved, env, link).is_empty()
}

/// Whether the artifact built for `resolved` should be run as a test.
pub fn should_be_tested(resolved: &ResolvedProperties, env: &Environment) -> bool {
    test_exclusions(resolved, env).is_empty()
}

impl ResolvedProperties {
    /// See [`should_be_built`].
    pub fn should_be_built(&self, env: &Environment, link: bool) -> bool {
        should_be_built(self, env, link)
    }

    /// See [`should_be_tested`].
    pub fn should_be_tested(&self, env: &Environment) -> bool {
        should_be_tested(self, env)
    }
}
