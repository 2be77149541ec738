use crate::domain::LogLevel;

/// Parsed minimum-level threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinLevel {
    /// No threshold configured: everything is delivered.
    Off,
    /// Deliver entries at or above this level.
    At(LogLevel),
    /// The configured threshold is not a known level: nothing is delivered.
    Unrecognized,
}

impl MinLevel {
    /// Only the six syslog-mapped levels are valid thresholds; `trace` and any
    /// other non-empty value fail closed.
    pub fn parse(min_level: &str) -> Self {
        if min_level.is_empty() {
            return MinLevel::Off;
        }
        match min_level.parse::<LogLevel>() {
            Ok(LogLevel::Trace) | Err(_) => MinLevel::Unrecognized,
            Ok(level) => MinLevel::At(level),
        }
    }

    pub fn allows(&self, level: LogLevel) -> bool {
        match self {
            MinLevel::Off => true,
            // A debug threshold passes everything, trace included
            MinLevel::At(LogLevel::Debug) => true,
            MinLevel::At(min) => level >= *min,
            MinLevel::Unrecognized => false,
        }
    }
}
