//! Expected vs. observed process outcomes.
//!
//! This is the one place where a [`Signal`] becomes a platform number: a
//! test driver runs an artifact, captures how it ended, and asks whether that
//! matches what the path's properties declare.

use std::fmt;

use crate::signal::Signal;

/// Shells report death-by-signal as `128 + signo`.
const SHELL_SIGNAL_OFFSET: i32 = 128;

/// How a test run is expected to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpectedOutcome {
    pub exit_status: i64,
    pub signal: Option<Signal>,
}

/// How a process actually ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Exited normally with this status.
    Exited(i32),
    /// Killed by this raw signal number.
    Signaled(i32),
}

impl ProcessOutcome {
    /// Capture the outcome of a finished child process.
    #[cfg(unix)]
    pub fn from_status(status: std::process::ExitStatus) -> Option<Self> {
        use std::os::unix::process::ExitStatusExt;

        status
            .code()
            .map(ProcessOutcome::Exited)
            .or_else(|| status.signal().map(ProcessOutcome::Signaled))
    }

    #[cfg(not(unix))]
    pub fn from_status(status: std::process::ExitStatus) -> Option<Self> {
        status.code().map(ProcessOutcome::Exited)
    }
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOutcome::Exited(code) => write!(f, "exit status {code}"),
            ProcessOutcome::Signaled(number) => match Signal::from_number(*number) {
                Some(signal) => write!(f, "signal {signal}"),
                None => write!(f, "signal {number}"),
            },
        }
    }
}

impl ExpectedOutcome {
    /// Whether `observed` is what this path is declared to do.
    ///
    /// With an expected signal, either a direct kill by that signal or a
    /// shell-reported `128 + signo` exit matches. Otherwise the exit status
    /// must equal `exit_status`.
    pub fn matches(&self, observed: ProcessOutcome) -> bool {
        match self.signal {
            Some(signal) => {
                let Some(number) = signal.number() else {
                    return false;
                };
                match observed {
                    ProcessOutcome::Signaled(raw) => raw == number,
                    ProcessOutcome::Exited(code) => code == SHELL_SIGNAL_OFFSET + number,
                }
            }
            None => matches!(observed, ProcessOutcome::Exited(code) if i64::from(code) == self.exit_status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_exit_status() {
        let expected = ExpectedOutcome {
            exit_status: 2,
            signal: None,
        };
        assert!(expected.matches(ProcessOutcome::Exited(2)));
        assert!(!expected.matches(ProcessOutcome::Exited(0)));
        assert!(!expected.matches(ProcessOutcome::Signaled(2)));
    }

    #[test]
    fn test_default_expects_success() {
        assert!(ExpectedOutcome::default().matches(ProcessOutcome::Exited(0)));
    }

    #[cfg(unix)]
    #[test]
    fn test_expected_signal() {
        let expected = ExpectedOutcome {
            exit_status: 0,
            signal: Some(Signal::Abort),
        };
        assert!(expected.matches(ProcessOutcome::Signaled(libc::SIGABRT)));
        assert!(expected.matches(ProcessOutcome::Exited(128 + libc::SIGABRT)));
        assert!(!expected.matches(ProcessOutcome::Signaled(libc::SIGSEGV)));
        assert!(!expected.matches(ProcessOutcome::Exited(0)));
    }

    #[cfg(unix)]
    #[test]
    fn test_display() {
        assert_eq!(ProcessOutcome::Exited(1).to_string(), "exit status 1");
        assert_eq!(
            ProcessOutcome::Signaled(libc::SIGILL).to_string(),
            "signal SIGILL"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_from_status() {
        let status = std::process::Command::new("sh")
            .args(["-c", "exit 3"])
            .status()
            .unwrap();
        assert_eq!(ProcessOutcome::from_status(status), Some(ProcessOutcome::Exited(3)));
    }
}
