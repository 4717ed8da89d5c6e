//! Expected process signals.
//!
//! Declarations talk about signals by name (`SIGABRT`, `SIGILL`, ...). Inside
//! the engine they are a closed enumeration; numeric codes only appear when a
//! test driver compares an observed process outcome (see [`crate::outcome`]).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A signal an example is expected to die with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signal {
    Abort,
    Bus,
    FloatingPoint,
    Hangup,
    IllegalInstruction,
    Interrupt,
    Kill,
    SegmentationFault,
    Terminate,
    Trap,
}

impl Signal {
    pub const ALL: [Signal; 10] = [
        Signal::Abort,
        Signal::Bus,
        Signal::FloatingPoint,
        Signal::Hangup,
        Signal::IllegalInstruction,
        Signal::Interrupt,
        Signal::Kill,
        Signal::SegmentationFault,
        Signal::Terminate,
        Signal::Trap,
    ];

    /// Conventional POSIX name, e.g. `SIGABRT`.
    pub fn name(self) -> &'static str {
        match self {
            Signal::Abort => "SIGABRT",
            Signal::Bus => "SIGBUS",
            Signal::FloatingPoint => "SIGFPE",
            Signal::Hangup => "SIGHUP",
            Signal::IllegalInstruction => "SIGILL",
            Signal::Interrupt => "SIGINT",
            Signal::Kill => "SIGKILL",
            Signal::SegmentationFault => "SIGSEGV",
            Signal::Terminate => "SIGTERM",
            Signal::Trap => "SIGTRAP",
        }
    }

    /// Platform signal number.
    ///
    /// `None` on platforms without POSIX signals.
    #[cfg(unix)]
    pub fn number(self) -> Option<i32> {
        Some(match self {
            Signal::Abort => libc::SIGABRT,
            Signal::Bus => libc::SIGBUS,
            Signal::FloatingPoint => libc::SIGFPE,
            Signal::Hangup => libc::SIGHUP,
            Signal::IllegalInstruction => libc::SIGILL,
            Signal::Interrupt => libc::SIGINT,
            Signal::Kill => libc::SIGKILL,
            Signal::SegmentationFault => libc::SIGSEGV,
            Signal::Terminate => libc::SIGTERM,
            Signal::Trap => libc::SIGTRAP,
        })
    }

    #[cfg(not(unix))]
    pub fn number(self) -> Option<i32> {
        None
    }

    /// Map a platform signal number back to a known signal.
    pub fn from_number(number: i32) -> Option<Signal> {
        Signal::ALL
            .into_iter()
            .find(|signal| signal.number() == Some(number))
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Signal {
    type Err = String;

    /// Accepts `SIGABRT`, `ABRT` and `abort` style spellings, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("SIG").unwrap_or(&upper);
        let signal = match bare {
            "ABRT" | "ABORT" => Signal::Abort,
            "BUS" => Signal::Bus,
            "FPE" => Signal::FloatingPoint,
            "HUP" | "HANGUP" => Signal::Hangup,
            "ILL" => Signal::IllegalInstruction,
            "INT" => Signal::Interrupt,
            "KILL" => Signal::Kill,
            "SEGV" => Signal::SegmentationFault,
            "TERM" => Signal::Terminate,
            "TRAP" => Signal::Trap,
            _ => return Err(format!("unknown signal name '{s}'")),
        };
        Ok(signal)
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Signal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
