//! Domain layer for rask-log-influx.
//!
//! Contains the canonical types shared across all modules:
//! - `Entry`: one structured log record as received from the logging pipeline
//! - `LogLevel`: entry severity (Trace/Debug/Info/Warning/Error/Fatal/Panic)
//! - `Point`: one time-series record handed to the sink
//! - `Severity`: syslog short name and numeric code derived from a level

pub mod log_entry;
pub mod log_level;
pub mod point;
pub mod severity;

pub use log_entry::Entry;
pub use log_level::{LogLevel, ParseLevelError};
pub use point::{FieldValue, Point};
pub use severity::Severity;
