//! The delivery adapter: filters entries, builds points and hands them to the
//! sink without waiting on the network.

pub mod builder;
mod error;
pub mod filter;

pub use builder::{Mode, PointBuilder, SyslogFields};
pub use error::HookError;
pub use filter::MinLevel;

use crate::config::Config;
use crate::domain::Entry;
use crate::sender::{Client, ErrorReceiver, HttpClient, WriteApi};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// What a logging framework needs from a hook.
pub trait LogHook: Send + Sync {
    /// Filters, transforms and submits one entry. Never blocks on I/O.
    fn fire(&self, entry: &Entry) -> Result<(), HookError>;

    /// Flushes pending points, then releases the sink.
    fn close(&self) -> impl Future<Output = ()> + Send;

    /// Hands out the stream of asynchronous delivery errors. Only the first
    /// call returns it.
    fn take_error_channel(&self) -> Option<ErrorReceiver>;
}

/// Where the hook's client comes from.
#[derive(Debug)]
pub enum ClientSource<C> {
    /// Build one from the configuration with [`Client::from_config`].
    Default,
    Provided(C),
}

impl<C> ClientSource<C> {
    /// Zero clients selects the default, one is used as is, more is an error.
    pub fn from_clients<I>(clients: I) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = C>,
    {
        let mut clients: Vec<C> = clients.into_iter().collect();
        if clients.len() > 1 {
            return Err(HookError::TooManyClients(clients.len()));
        }
        Ok(clients.pop().map_or(ClientSource::Default, ClientSource::Provided))
    }
}

/// Delivers log entries to InfluxDB.
pub struct InfluxHook<C: Client = HttpClient> {
    client: C,
    writer: C::Writer,
    config: Config,
    min_level: MinLevel,
    builder: PointBuilder,
    errors: Mutex<Option<ErrorReceiver>>,
    closed: AtomicBool,
}

impl InfluxHook<HttpClient> {
    /// Creates a hook writing through the default HTTP client.
    pub async fn connect(config: Config) -> Result<Self, HookError> {
        Self::new(config, ClientSource::Default).await
    }
}

impl<C: Client> InfluxHook<C> {
    /// Resolves the configuration, obtains a client and checks that the
    /// server is ready. No hook exists unless every step succeeds.
    pub async fn new(mut config: Config, source: ClientSource<C>) -> Result<Self, HookError> {
        config.resolve();

        let client = match source {
            ClientSource::Default => C::from_config(&config)?,
            ClientSource::Provided(client) => client,
        };

        match client.ready().await {
            Ok(true) => {}
            Ok(false) => return Err(HookError::NotReady),
            Err(e) => return Err(HookError::ReadinessCheck(e)),
        }

        let writer = client.write_api(&config.organization, &config.bucket);
        let errors = writer.take_errors();

        info!(
            "InfluxDB hook ready: bucket={} measurement={} syslog={} min_level={:?}",
            config.bucket, config.measurement, config.syslog, config.min_level
        );

        Ok(Self {
            min_level: MinLevel::parse(&config.min_level),
            builder: PointBuilder::from_config(&config),
            client,
            writer,
            config,
            errors: Mutex::new(errors),
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn min_level(&self) -> MinLevel {
        self.min_level
    }
}

impl<C: Client> LogHook for InfluxHook<C> {
    fn fire(&self, entry: &Entry) -> Result<(), HookError> {
        if self.closed.load(Ordering::Acquire) || !self.min_level.allows(entry.level) {
            return Ok(());
        }
        let point = self.builder.build(entry)?;
        self.writer.write_point(point);
        Ok(())
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.writer.flush().await;
        self.client.close().await;
        info!("InfluxDB hook closed");
    }

    fn take_error_channel(&self) -> Option<ErrorReceiver> {
        self.errors.lock().take()
    }
}

impl<C: Client> std::fmt::Debug for InfluxHook<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxHook")
            .field("config", &self.config)
            .field("min_level", &self.min_level)
            .field("builder", &self.builder)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_count_selects_source() {
        assert!(matches!(
            ClientSource::<u8>::from_clients(Vec::new()),
            Ok(ClientSource::Default)
        ));
        assert!(matches!(
            ClientSource::from_clients([7u8]),
            Ok(ClientSource::Provided(7))
        ));
        assert!(matches!(
            ClientSource::from_clients([1u8, 2, 3]),
            Err(HookError::TooManyClients(3))
        ));
    }
}
