//! Severity levels and the threshold filter.

use std::fmt;

/// Severity of a single emission. Lower rank is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warn,
    Info,
    Debug,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Error, Severity::Warn, Severity::Info, Severity::Debug];

    /// Rank in the `error < warn < info < debug` order.
    pub fn rank(self) -> i8 {
        match self {
            Severity::Error => 0,
            Severity::Warn => 1,
            Severity::Info => 2,
            Severity::Debug => 3,
        }
    }

    /// Configuration name (`"error"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }

    /// Tag used inside text lines (`"ERROR"`, ...).
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// Exact, case-sensitive lookup by configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The configured minimum severity.
///
/// An unrecognized level name has rank -1 and admits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold(Option<Severity>);

impl Threshold {
    pub fn new(level: Severity) -> Self {
        Self(Some(level))
    }

    /// Resolve a configured level name. Never fails.
    pub fn parse(name: &str) -> Self {
        Self(Severity::from_name(name))
    }

    pub fn level(&self) -> Option<Severity> {
        self.0
    }

    pub fn rank(&self) -> i8 {
        self.0.map_or(-1, Severity::rank)
    }

    /// An emission at `severity` passes iff its rank is at most the threshold rank.
    pub fn admits(&self, severity: Severity) -> bool {
        severity.rank() <= self.rank()
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}
