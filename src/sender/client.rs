use super::writer::{HttpWriteApi, WriteTarget};
use super::{Client, ClientError};
use crate::config::{Config, Precision};
use parking_lot::Mutex;
use reqwest::ClientBuilder;
use serde::Deserialize;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct ReadyResponse {
    status: String,
}

/// Default sink: InfluxDB v2 HTTP API.
///
/// Every write handle runs its own batching task; [`Client::close`] stops
/// them all after they have drained what was already enqueued.
#[derive(Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    precision: Precision,
    batch_size: usize,
    flush_interval: Duration,
    shutdown: CancellationToken,
    writers: Mutex<Vec<JoinHandle<()>>>,
}

impl HttpClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let base_url: Url = config.server_url().parse().map_err(|e| {
            ClientError::InvalidConfiguration(format!(
                "Invalid server URL '{}': {}",
                config.server_url(),
                e
            ))
        })?;

        let http = ClientBuilder::new()
            .connect_timeout(config.timeout)
            .user_agent(concat!("rask-log-influx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ClientError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
            precision: config.precision,
            batch_size: config.batch_count.max(1),
            flush_interval: config.batch_interval().max(Duration::from_millis(1)),
            shutdown: CancellationToken::new(),
            writers: Mutex::new(Vec::new()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn write_url(&self, org: &str, bucket: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/api/v2/write");
        url.query_pairs_mut()
            .append_pair("org", org)
            .append_pair("bucket", bucket)
            .append_pair("precision", self.precision.as_str());
        url
    }
}

impl Client for HttpClient {
    type Writer = HttpWriteApi;

    fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(config)
    }

    async fn ready(&self) -> Result<bool, ClientError> {
        let mut ready_url = self.base_url.clone();
        ready_url.set_path("/ready");

        let response = self.http.get(ready_url).send().await?;
        if !response.status().is_success() {
            debug!("Ready check returned HTTP {}", response.status());
            return Ok(false);
        }

        match response.json::<ReadyResponse>().await {
            Ok(body) => Ok(body.status == "ready"),
            Err(e) => {
                debug!("Ready check returned an unreadable body: {}", e);
                Ok(false)
            }
        }
    }

    /// Spawns the batching task, so it must be called within a Tokio runtime.
    fn write_api(&self, org: &str, bucket: &str) -> HttpWriteApi {
        let target = WriteTarget {
            http: self.http.clone(),
            url: self.write_url(org, bucket),
            token: self.token.clone(),
            precision: self.precision,
        };
        let (write_api, task) = HttpWriteApi::spawn(
            target,
            self.batch_size,
            self.flush_interval,
            self.shutdown.child_token(),
        );
        self.writers.lock().push(task);
        write_api
    }

    async fn close(&self) {
        self.shutdown.cancel();
        let writers = std::mem::take(&mut *self.writers.lock());
        for writer in writers {
            if let Err(e) = writer.await {
                warn!("Write task ended abnormally: {}", e);
            }
        }
    }
}
