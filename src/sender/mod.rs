//! Sink side of the hook: the contract a time-series client has to satisfy,
//! and the default HTTP client that writes InfluxDB line protocol.

pub mod client;
pub mod line_protocol;
pub mod writer;

use crate::config::Config;
use crate::domain::Point;
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;

pub use client::HttpClient;
pub use writer::HttpWriteApi;

/// Capacity of the default sink's error channel. Errors beyond it are dropped
/// until the receiver catches up.
pub const ERROR_CHANNEL_CAPACITY: usize = 64;

/// Read-only stream of asynchronous delivery errors.
pub type ErrorReceiver = mpsc::Receiver<WriteError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Failure of a background write, reported on the error stream.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },
    #[error("Encoding error: {0}")]
    EncodingError(#[from] std::io::Error),
}

/// A time-series client the hook writes through.
pub trait Client: Send + Sync + Sized + 'static {
    type Writer: WriteApi;

    /// Builds the client the hook uses when none is supplied.
    fn from_config(config: &Config) -> Result<Self, ClientError>;

    /// Reports whether the server accepts writes.
    fn ready(&self) -> impl Future<Output = Result<bool, ClientError>> + Send;

    /// Returns a non-blocking write handle for one organization and bucket.
    fn write_api(&self, org: &str, bucket: &str) -> Self::Writer;

    /// Releases connections and background tasks.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// Non-blocking write handle obtained from a [`Client`].
pub trait WriteApi: Send + Sync + 'static {
    /// Enqueues a point. Never waits on the network.
    fn write_point(&self, point: Point);

    /// Writes everything enqueued so far and waits for it.
    fn flush(&self) -> impl Future<Output = ()> + Send;

    /// Hands out the error stream. Only the first call returns it.
    fn take_errors(&self) -> Option<ErrorReceiver>;
}
