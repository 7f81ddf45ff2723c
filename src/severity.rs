use std::fmt;

use serde::{Deserialize, Serialize};

/// Record severity, ordered by rank. Numeric ranks match the conventional
/// logging levels so thresholds compare the obvious way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    pub fn rank(self) -> u8 {
        self as u8
    }

    /// True for low-severity records (below warning).
    pub fn is_fyi(self) -> bool {
        self < Severity::Warning
    }

    /// True for high-severity records (warning and above).
    pub fn is_alert(self) -> bool {
        !self.is_fyi()
    }

    /// Contextual marker stamped onto file-bound renderings.
    pub fn glyph(self) -> &'static str {
        match self {
            Severity::Debug => "⚪",
            Severity::Info => "⬛",
            Severity::Warning => "🟧",
            Severity::Error => "🟥",
            Severity::Critical => "🟥🟥",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
