use super::log_level::LogLevel;

/// Syslog severity derived from a log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Severity {
    pub name: &'static str,
    pub code: i64,
}

impl Severity {
    pub const NONE: Severity = Severity {
        name: "none",
        code: -1,
    };

    /// Maps a level name to its syslog severity, or [`Severity::NONE`] for
    /// anything that is not one of the six defined levels.
    pub fn from_level_name(level: &str) -> Severity {
        let (name, code) = match level {
            "info" => ("info", 6),
            "error" => ("err", 3),
            "debug" => ("debug", 7),
            "panic" => ("panic", 0),
            "fatal" => ("crit", 2),
            "warning" => ("warning", 4),
            _ => return Severity::NONE,
        };
        Severity { name, code }
    }
}

impl From<LogLevel> for Severity {
    fn from(level: LogLevel) -> Self {
        Severity::from_level_name(level.as_str())
    }
}
