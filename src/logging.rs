//! Installs the hook as part of the global `tracing` subscriber.

use crate::hook::LogHook;
use crate::layer::InfluxLayer;
use std::sync::Arc;
use thiserror::Error;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid filter directive '{directive}': {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: ParseError,
    },
    #[error("Failed to set global tracing subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),
}

/// Builds a subscriber that filters with `directive`, prints compact lines to
/// stdout and forwards the same events to `hook`.
pub fn subscriber<H>(
    hook: Arc<H>,
    directive: &str,
) -> Result<impl Subscriber + Send + Sync + use<H>, LoggingError>
where
    H: LogHook + 'static,
{
    let env_filter = EnvFilter::try_new(directive).map_err(|source| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        source,
    })?;

    Ok(tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .compact(),
        )
        .with(InfluxLayer::new(hook)))
}

/// Installs [`subscriber`] as the global default. Fails if one is already set.
pub fn init<H>(hook: Arc<H>, directive: &str) -> Result<(), LoggingError>
where
    H: LogHook + 'static,
{
    tracing::subscriber::set_global_default(subscriber(hook, directive)?)?;
    Ok(())
}
