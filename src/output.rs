//! Terminal styling for `check`, `resolve` and `validate`.
//!
//! `--color=always` and `--color=never` are final. Anything else means auto:
//! the `NO_COLOR`, `CLICOLOR`, `CLICOLOR_FORCE` and `TERM` variables are
//! consulted in that order, and when none of them decides, colors follow
//! whether stdout is a color terminal.

use console::style;
use std::env;

/// Status line prefixes printed by `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Scan,
    Valid,
    Invalid,
}

impl Marker {
    fn glyph(self) -> &'static str {
        match self {
            Marker::Scan => "🔍",
            Marker::Valid => "✅",
            Marker::Invalid => "❌",
        }
    }

    fn plain(self) -> &'static str {
        match self {
            Marker::Scan => "[SCAN]",
            Marker::Valid => "[OK]",
            Marker::Invalid => "[ERR]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_ascii_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => color_from_env(|name| env::var_os(name).map(|v| v.to_string_lossy().into_owned()))
                .unwrap_or_else(|| console::Term::stdout().features().colors_supported()),
        };
        Self { use_color }
    }

    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// `yes`/`no` answer to "is this path built/tested".
    pub fn verdict(&self, ok: bool) -> String {
        let text = if ok { "yes" } else { "no" };
        if !self.use_color {
            return text.to_string();
        }
        let styled = if ok { style(text).green() } else { style(text).red() };
        styled.bold().force_styling(true).to_string()
    }

    /// A property name.
    pub fn key(&self, name: &str) -> String {
        if self.use_color {
            style(name).cyan().force_styling(true).to_string()
        } else {
            name.to_string()
        }
    }

    pub fn marker(&self, marker: Marker) -> &'static str {
        if self.use_color {
            marker.glyph()
        } else {
            marker.plain()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Auto-mode decision from the color variables alone, `None` when they leave
/// it to the terminal.
fn color_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<bool> {
    if lookup("NO_COLOR").is_some() {
        return Some(false);
    }
    if lookup("CLICOLOR").as_deref() == Some("0") {
        return Some(false);
    }
    if lookup("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
        return Some(true);
    }
    if lookup("TERM").as_deref() == Some("dumb") {
        return Some(false);
    }
    None
}
