#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Durations and batch sizes stay within realistic bounds
    clippy::cast_possible_wrap,       // Process ids fit in i64
    clippy::missing_errors_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. HookError in hook module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

//! Delivers structured log entries to InfluxDB as time-series points.
//!
//! An [`InfluxHook`] filters each [`Entry`] by a minimum level, turns it into
//! a [`Point`] and hands it to a sink [`Client`](sender::Client) that batches
//! and writes asynchronously. The [`layer::InfluxLayer`] plugs the hook into a
//! `tracing` subscriber.

pub mod config;
pub mod domain;
pub mod hook;
pub mod layer;
pub mod logging;
pub mod sender;

pub use config::{Config, ConfigError, Precision};
pub use domain::{Entry, FieldValue, LogLevel, Point, Severity};
pub use hook::{ClientSource, HookError, InfluxHook, LogHook};
pub use layer::InfluxLayer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
