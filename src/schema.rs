//! # Property Schema
//!
//! The closed set of properties a declaration may set, with each property's
//! value kind, default value and merge strategy. This is the single source of
//! truth for what a path can declare: [`Property`] is an enum, so a property
//! outside the schema cannot even be represented once a declaration has been
//! parsed.
//!
//! ## Key Components
//!
//! - **`Property`**: one variant per recognized property name.
//! - **`PropertyKind`**: the shape a property's value must have.
//! - **`MergeStrategy`**: how an inherited value and a more specific one are
//!   combined during resolution (see [`crate::merge`]).
//! - **`PropertyValue`**: a value of any kind, checked against the property's
//!   kind when an override record is built.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::signal::Signal;
use crate::suggestions;

/// Default C standard passed to the compiler.
pub const DEFAULT_C_STD: &str = "c11";

/// Default C++ standard passed to the compiler.
pub const DEFAULT_CXX_STD: &str = "c++17";

/// Every property a declaration may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// Architectures the path may be built for. Unset means all.
    AllowedArchs,
    /// Uses aarch32 instructions absent from ARMv7, so cannot run freestanding.
    ArmAarch32,
    /// Eligible for freestanding (baremetal) builds.
    Baremetal,
    CStd,
    /// Compiler flags placed before the sources.
    CcFlags,
    /// Compiler flags placed after the sources, e.g. libraries.
    CcFlagsAfter,
    CcPedantic,
    CxxStd,
    /// Running it leaves the system unusable for further tests.
    DisruptsSystem,
    /// Expected exit status as reported by a shell.
    ExitStatus,
    ExtraObjs,
    ExtraObjsDisableBaremetalBootloader,
    ExtraObjsLkmcCommon,
    /// Uses an instruction the cycle-accurate emulator does not implement.
    Gem5UnimplementedInstruction,
    /// Uses an instruction the fast functional emulator does not implement.
    QemuUnimplementedInstruction,
    /// `int` system calls fault under the fast emulator on x86_64.
    QemuX86_64IntSyscall,
    Interactive,
    /// Takes a perceptible amount of time, possibly forever.
    MoreThan1s,
    NoBuild,
    /// Produces only intermediate objects, never an executable.
    NoExecutable,
    RequiresArgument,
    RequiresDynamicLibrary,
    /// Needs hardware performance-counter (m5) ops.
    RequiresM5ops,
    RequiresSyscallGetcpu,
    RequiresSemihosting,
    RequiresKernelModules,
    RequiresSudo,
    /// The expected signal is raised implicitly by the OS (e.g. SIGILL).
    SignalGeneratedByOs,
    SignalReceived,
    SkipRunUnclassified,
    /// Extra arguments passed to the runner during tests only.
    TestRunArgs,
    /// Eligible for hosted (userland) builds.
    Userland,
}

/// The shape of a property's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Bool,
    Integer,
    Text,
    /// Optional set of architecture names.
    Archs,
    /// Optional expected signal.
    Signal,
    /// Ordered list of tokens.
    List,
    /// Mapping from argument name to scalar.
    Map,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Bool => "a boolean",
            PropertyKind::Integer => "an integer",
            PropertyKind::Text => "a string",
            PropertyKind::Archs => "null, an architecture name or a list of architecture names",
            PropertyKind::Signal => "null or a signal name",
            PropertyKind::List => "a list of strings",
            PropertyKind::Map => "a mapping of names to scalars",
        };
        f.write_str(name)
    }
}

/// How a more specific value combines with an inherited one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The more specific value replaces the inherited one.
    Overwrite,
    /// Inherited entries first, then the more specific ones.
    Concatenate,
    /// Keyed union; the more specific entry wins on a shared key.
    ShallowMerge,
}

impl Property {
    pub const ALL: [Property; 32] = [
        Property::AllowedArchs,
        Property::ArmAarch32,
        Property::Baremetal,
        Property::CStd,
        Property::CcFlags,
        Property::CcFlagsAfter,
        Property::CcPedantic,
        Property::CxxStd,
        Property::DisruptsSystem,
        Property::ExitStatus,
        Property::ExtraObjs,
        Property::ExtraObjsDisableBaremetalBootloader,
        Property::ExtraObjsLkmcCommon,
        Property::Gem5UnimplementedInstruction,
        Property::QemuUnimplementedInstruction,
        Property::QemuX86_64IntSyscall,
        Property::Interactive,
        Property::MoreThan1s,
        Property::NoBuild,
        Property::NoExecutable,
        Property::RequiresArgument,
        Property::RequiresDynamicLibrary,
        Property::RequiresM5ops,
        Property::RequiresSyscallGetcpu,
        Property::RequiresSemihosting,
        Property::RequiresKernelModules,
        Property::RequiresSudo,
        Property::SignalGeneratedByOs,
        Property::SignalReceived,
        Property::SkipRunUnclassified,
        Property::TestRunArgs,
        Property::Userland,
    ];

    /// The name used in declarations.
    pub fn as_str(self) -> &'static str {
        match self {
            Property::AllowedArchs => "allowed_archs",
            Property::ArmAarch32 => "arm_aarch32",
            Property::Baremetal => "baremetal",
            Property::CStd => "c_std",
            Property::CcFlags => "cc_flags",
            Property::CcFlagsAfter => "cc_flags_after",
            Property::CcPedantic => "cc_pedantic",
            Property::CxxStd => "cxx_std",
            Property::DisruptsSystem => "disrupts_system",
            Property::ExitStatus => "exit_status",
            Property::ExtraObjs => "extra_objs",
            Property::ExtraObjsDisableBaremetalBootloader => {
                "extra_objs_disable_baremetal_bootloader"
            }
            Property::ExtraObjsLkmcCommon => "extra_objs_lkmc_common",
            Property::Gem5UnimplementedInstruction => "gem5_unimplemented_instruction",
            Property::QemuUnimplementedInstruction => "qemu_unimplemented_instruction",
            Property::QemuX86_64IntSyscall => "qemu_x86_64_int_syscall",
            Property::Interactive => "interactive",
            Property::MoreThan1s => "more_than_1s",
            Property::NoBuild => "no_build",
            Property::NoExecutable => "no_executable",
            Property::RequiresArgument => "requires_argument",
            Property::RequiresDynamicLibrary => "requires_dynamic_library",
            Property::RequiresM5ops => "requires_m5ops",
            Property::RequiresSyscallGetcpu => "requires_syscall_getcpu",
            Property::RequiresSemihosting => "requires_semihosting",
            Property::RequiresKernelModules => "requires_kernel_modules",
            Property::RequiresSudo => "requires_sudo",
            Property::SignalGeneratedByOs => "signal_generated_by_os",
            Property::SignalReceived => "signal_received",
            Property::SkipRunUnclassified => "skip_run_unclassified",
            Property::TestRunArgs => "test_run_args",
            Property::Userland => "userland",
        }
    }

    pub fn kind(self) -> PropertyKind {
        match self {
            Property::AllowedArchs => PropertyKind::Archs,
            Property::CStd | Property::CxxStd => PropertyKind::Text,
            Property::CcFlags | Property::CcFlagsAfter | Property::ExtraObjs => PropertyKind::List,
            Property::ExitStatus => PropertyKind::Integer,
            Property::SignalReceived => PropertyKind::Signal,
            Property::TestRunArgs => PropertyKind::Map,
            _ => PropertyKind::Bool,
        }
    }

    /// The merge-strategy table consulted by [`crate::merge::merge_into`].
    pub fn merge_strategy(self) -> MergeStrategy {
        match self {
            Property::CcFlags | Property::CcFlagsAfter | Property::ExtraObjs => {
                MergeStrategy::Concatenate
            }
            Property::TestRunArgs => MergeStrategy::ShallowMerge,
            _ => MergeStrategy::Overwrite,
        }
    }

    pub fn default_value(self) -> PropertyValue {
        match self {
            Property::AllowedArchs => PropertyValue::Archs(None),
            Property::CStd => PropertyValue::Text(DEFAULT_C_STD.to_string()),
            Property::CxxStd => PropertyValue::Text(DEFAULT_CXX_STD.to_string()),
            Property::CcFlags => PropertyValue::flags([
                "-Wall",
                "-Werror",
                "-Wextra",
                "-Wno-unused-function",
                "-ggdb3",
                // PIE breaks emulator step debugging and complicates hand-written assembly.
                "-fno-pie",
                "-no-pie",
            ]),
            Property::CcFlagsAfter => PropertyValue::flags(["-lm"]),
            Property::CcPedantic => PropertyValue::Bool(true),
            Property::ExitStatus => PropertyValue::Integer(0),
            Property::ExtraObjs => PropertyValue::List(Vec::new()),
            Property::SignalReceived => PropertyValue::Signal(None),
            Property::TestRunArgs => PropertyValue::Map(BTreeMap::new()),
            _ => PropertyValue::Bool(false),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Property::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::UnknownProperty {
                key: s.to_string(),
                hint: suggestions::unknown_property_hint(s),
            })
    }
}

impl Serialize for Property {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The architectures a path may be built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArchSet {
    Set(BTreeSet<String>),
    /// A bare architecture name where a set was expected.
    ///
    /// Membership is substring containment on the name, so `x86_64` admits
    /// `x86_64` but also `x86` or `_64`. Existing declarations rely on the
    /// exact behaviour; see the `allowed_archs` tests in `eligibility`.
    Name(String),
}

impl ArchSet {
    pub fn contains(&self, arch: &str) -> bool {
        match self {
            ArchSet::Set(archs) => archs.contains(arch),
            ArchSet::Name(name) => name.contains(arch),
        }
    }
}

/// A scalar value in the `test_run_args` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunArg {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl fmt::Display for RunArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunArg::Bool(b) => write!(f, "{b}"),
            RunArg::Integer(i) => write!(f, "{i}"),
            RunArg::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RunArg {
    fn from(value: i64) -> Self {
        RunArg::Integer(value)
    }
}

impl From<i32> for RunArg {
    fn from(value: i32) -> Self {
        RunArg::Integer(i64::from(value))
    }
}

impl From<bool> for RunArg {
    fn from(value: bool) -> Self {
        RunArg::Bool(value)
    }
}

impl From<&str> for RunArg {
    fn from(value: &str) -> Self {
        RunArg::Text(value.to_string())
    }
}

/// A property value of any kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    Archs(Option<ArchSet>),
    Signal(Option<Signal>),
    List(Vec<String>),
    Map(BTreeMap<String, RunArg>),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Integer(_) => PropertyKind::Integer,
            PropertyValue::Text(_) => PropertyKind::Text,
            PropertyValue::Archs(_) => PropertyKind::Archs,
            PropertyValue::Signal(_) => PropertyKind::Signal,
            PropertyValue::List(_) => PropertyKind::List,
            PropertyValue::Map(_) => PropertyKind::Map,
        }
    }

    /// A set of architecture names.
    pub fn archs<I, S>(archs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PropertyValue::Archs(Some(ArchSet::Set(archs.into_iter().map(Into::into).collect())))
    }

    /// A bare architecture name, see [`ArchSet::Name`].
    pub fn arch_name(name: impl Into<String>) -> Self {
        PropertyValue::Archs(Some(ArchSet::Name(name.into())))
    }

    pub fn flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PropertyValue::List(flags.into_iter().map(Into::into).collect())
    }

    pub fn run_args<I, K, V>(args: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RunArg>,
    {
        PropertyValue::Map(args.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Convert a YAML value into a value of `property`'s kind.
    pub fn from_yaml(property: Property, value: &serde_yaml::Value) -> Result<Self> {
        use serde_yaml::Value;

        let kind = property.kind();
        let mismatch = || Error::InvalidValue {
            property: property.to_string(),
            message: format!("expected {kind}, found {}", describe_yaml(value)),
        };

        let converted = match (kind, value) {
            (PropertyKind::Bool, Value::Bool(b)) => PropertyValue::Bool(*b),
            (PropertyKind::Integer, Value::Number(n)) => {
                PropertyValue::Integer(n.as_i64().ok_or_else(mismatch)?)
            }
            (PropertyKind::Text, Value::String(s)) => PropertyValue::Text(s.clone()),
            (PropertyKind::Archs, Value::Null) => PropertyValue::Archs(None),
            (PropertyKind::Archs, Value::String(name)) => PropertyValue::arch_name(name.clone()),
            (PropertyKind::Archs, Value::Sequence(items)) => {
                PropertyValue::archs(yaml_strings(items).ok_or_else(mismatch)?)
            }
            (PropertyKind::Signal, Value::Null) => PropertyValue::Signal(None),
            (PropertyKind::Signal, Value::String(name)) => {
                let signal = name.parse().map_err(|message| Error::InvalidValue {
                    property: property.to_string(),
                    message,
                })?;
                PropertyValue::Signal(Some(signal))
            }
            (PropertyKind::List, Value::Sequence(items)) => {
                PropertyValue::List(yaml_strings(items).ok_or_else(mismatch)?)
            }
            (PropertyKind::Map, Value::Mapping(_)) => {
                let args: BTreeMap<String, RunArg> =
                    serde_yaml::from_value(value.clone()).map_err(|e| Error::InvalidValue {
                        property: property.to_string(),
                        message: e.to_string(),
                    })?;
                PropertyValue::Map(args)
            }
            _ => return Err(mismatch()),
        };
        Ok(converted)
    }
}

/// Compact one-line rendering, e.g. `[arm, aarch64]` or `{cpus: 2}`.
impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Integer(i) => write!(f, "{i}"),
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Archs(None) | PropertyValue::Signal(None) => f.write_str("null"),
            PropertyValue::Archs(Some(ArchSet::Name(name))) => f.write_str(name),
            PropertyValue::Archs(Some(ArchSet::Set(archs))) => {
                write!(f, "[{}]", archs.iter().cloned().collect::<Vec<_>>().join(", "))
            }
            PropertyValue::Signal(Some(signal)) => write!(f, "{signal}"),
            PropertyValue::List(items) => write!(f, "[{}]", items.join(", ")),
            PropertyValue::Map(args) => {
                let args: Vec<String> = args.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", args.join(", "))
            }
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Integer(i64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<Signal> for PropertyValue {
    fn from(value: Signal) -> Self {
        PropertyValue::Signal(Some(value))
    }
}

fn yaml_strings(items: &[serde_yaml::Value]) -> Option<Vec<String>> {
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn describe_yaml(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
