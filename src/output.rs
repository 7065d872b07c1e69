//! # Output Formatting
//!
//! Terminal rendering for the `scm-mirror` binary: whether to decorate output,
//! and how revisions and check results are printed.
//!
//! Decoration follows the usual conventions:
//! - `--color=always|never|auto`
//! - `NO_COLOR` set (any value) disables decoration
//! - `CLICOLOR=0` disables it, `CLICOLOR_FORCE=1` forces it
//! - `TERM=dumb` disables it
//!
//! Machine-readable output (`--json`) never goes through this module.

use std::env;
use std::fmt::Write as _;

use crate::revision::Revision;

/// Whether decorated (emoji) output should be used.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the `--color` flag against the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Leading marker of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Ok,
    Fail,
    Sync,
    Info,
}

impl Marker {
    fn render(self, config: &OutputConfig) -> &'static str {
        match (self, config.use_color) {
            (Marker::Ok, true) => "✅",
            (Marker::Ok, false) => "[OK]",
            (Marker::Fail, true) => "❌",
            (Marker::Fail, false) => "[ERR]",
            (Marker::Sync, true) => "🔄",
            (Marker::Sync, false) => "[SYNC]",
            (Marker::Info, true) => "📋",
            (Marker::Info, false) => "[INFO]",
        }
    }
}

/// A single status line: marker, space, message.
pub fn status(config: &OutputConfig, marker: Marker, message: &str) -> String {
    format!("{} {}", marker.render(config), message)
}

/// Human-readable block for one revision, `git log --name-status` style.
pub fn render_revision(revision: &Revision) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "revision {}", revision.id);
    let _ = writeln!(out, "Author: {}", revision.author_email);
    let _ = writeln!(out, "Date:   {}", revision.formatted_timestamp());
    let _ = writeln!(out);
    for line in revision.message.lines() {
        let _ = writeln!(out, "    {}", line);
    }
    if !revision.changes.is_empty() {
        let _ = writeln!(out);
        for change in &revision.changes {
            let _ = writeln!(out, "{:<9}{}", change.action.as_str(), change.path);
        }
    }
    out
}
