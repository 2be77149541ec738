mod loader;
pub mod serde_helpers;

pub use loader::CONFIG_ENV;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Environment error: {0}")]
    EnvError(String),
}

/// Timestamp resolution of written points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Precision {
    #[default]
    #[serde(rename = "ns")]
    Nanoseconds,
    #[serde(rename = "us")]
    Microseconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
}

impl Precision {
    /// Value of the `precision` query parameter of the write endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Nanoseconds => "ns",
            Precision::Microseconds => "us",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ns" => Ok(Precision::Nanoseconds),
            "us" => Ok(Precision::Microseconds),
            "ms" => Ok(Precision::Milliseconds),
            "s" => Ok(Precision::Seconds),
            other => Err(format!("expected one of ns, us, ms, s; got '{other}'")),
        }
    }
}

/// Values substituted for unset configuration fields.
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
    pub host: &'static str,
    pub port: u16,
    pub timeout: Duration,
    pub bucket: &'static str,
    pub precision: Precision,
    pub measurement: &'static str,
    pub batch_count: usize,
    pub batch_interval_ms: u64,
}

pub const DEFAULTS: Defaults = Defaults {
    host: "localhost",
    port: 8086,
    timeout: Duration::from_millis(100),
    bucket: "logrus",
    precision: Precision::Nanoseconds,
    measurement: "logrus",
    batch_count: 200,
    batch_interval_ms: 5000,
};

/// Hook configuration: sink connection, batching hints, point shaping and
/// level filtering.
///
/// Empty strings and zero numbers mean "unset"; [`Config::default`] is the
/// fully unset configuration. [`Config::resolve`] fills every unset field
/// from [`DEFAULTS`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // InfluxDB connection
    #[serde(rename = "influxdb_host")]
    pub host: String,
    #[serde(rename = "influxdb_port")]
    pub port: u16,
    /// Connection timeout, milliseconds on the wire.
    #[serde(rename = "influxdb_timeout", with = "serde_helpers")]
    pub timeout: Duration,
    #[serde(rename = "influxdb_bucket")]
    pub bucket: String,
    #[serde(rename = "influx_organization")]
    pub organization: String,
    #[serde(rename = "influx_token")]
    pub token: String,
    #[serde(rename = "influxdb_https")]
    pub use_https: bool,
    #[serde(rename = "influxdb_precision")]
    pub precision: Precision,

    // Syslog format for the chronograf log viewer
    #[serde(rename = "syslog_enabled")]
    pub syslog: bool,
    #[serde(rename = "syslog_facility")]
    pub facility: String,
    #[serde(rename = "syslog_facility_code")]
    pub facility_code: i64,
    #[serde(rename = "syslog_app_name")]
    pub app_name: String,
    #[serde(rename = "syslog_app_version")]
    pub version: String,

    /// Minimum level to deliver; empty disables filtering.
    #[serde(rename = "syslog_min_level")]
    pub min_level: String,

    /// Entry fields promoted to tags (and removed from fields).
    #[serde(rename = "log_tags")]
    pub tags: Vec<String>,

    pub measurement: String,

    // Batching hints for the sink
    #[serde(rename = "batch_interval")]
    pub batch_interval_ms: u64,
    pub batch_count: usize,
}

impl Config {
    /// Fills every unset field with its default. Idempotent.
    pub fn resolve(&mut self) {
        if self.host.is_empty() {
            self.host = DEFAULTS.host.to_string();
        }
        if self.port == 0 {
            self.port = DEFAULTS.port;
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULTS.timeout;
        }
        if self.bucket.is_empty() {
            self.bucket = DEFAULTS.bucket.to_string();
        }
        if self.measurement.is_empty() {
            self.measurement = DEFAULTS.measurement.to_string();
        }
        if self.batch_count == 0 {
            self.batch_count = DEFAULTS.batch_count;
        }
        if self.batch_interval_ms == 0 {
            self.batch_interval_ms = DEFAULTS.batch_interval_ms;
        }
    }

    pub fn resolved(mut self) -> Self {
        self.resolve();
        self
    }

    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }

    /// Base URL of the InfluxDB server.
    pub fn server_url(&self) -> String {
        let protocol = if self.use_https { "https" } else { "http" };
        format!("{}://{}:{}", protocol, self.host, self.port)
    }
}
