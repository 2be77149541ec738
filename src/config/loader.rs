use super::serde_helpers::{load_env_list, load_env_millis, load_env_string, load_env_var};
use super::{Config, ConfigError};
use std::path::Path;

/// Environment variable holding a complete TOML configuration.
pub const CONFIG_ENV: &str = "RASK_INFLUX_CONFIG";

impl Config {
    /// Loads a resolved configuration from the environment.
    ///
    /// `RASK_INFLUX_CONFIG`, when set, is parsed as TOML and wins outright.
    /// Otherwise each field is read from its upper-cased key
    /// (`INFLUXDB_HOST`, `SYSLOG_MIN_LEVEL`, ...); unset variables keep the
    /// field unset so that it resolves to its default.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(toml_config) = std::env::var(CONFIG_ENV) {
            return Self::from_toml_str(&toml_config);
        }

        let mut config = Config::default();

        load_env_string("INFLUXDB_HOST", &mut config.host);
        load_env_var("INFLUXDB_PORT", &mut config.port)?;
        load_env_millis("INFLUXDB_TIMEOUT", &mut config.timeout)?;
        load_env_string("INFLUXDB_BUCKET", &mut config.bucket);
        load_env_string("INFLUX_ORGANIZATION", &mut config.organization);
        load_env_string("INFLUX_TOKEN", &mut config.token);
        load_env_var("INFLUXDB_HTTPS", &mut config.use_https)?;
        load_env_var("INFLUXDB_PRECISION", &mut config.precision)?;

        load_env_var("SYSLOG_ENABLED", &mut config.syslog)?;
        load_env_string("SYSLOG_FACILITY", &mut config.facility);
        load_env_var("SYSLOG_FACILITY_CODE", &mut config.facility_code)?;
        load_env_string("SYSLOG_APP_NAME", &mut config.app_name);
        load_env_string("SYSLOG_APP_VERSION", &mut config.version);
        load_env_string("SYSLOG_MIN_LEVEL", &mut config.min_level);

        load_env_list("LOG_TAGS", &mut config.tags);
        load_env_string("MEASUREMENT", &mut config.measurement);
        load_env_var("BATCH_INTERVAL", &mut config.batch_interval_ms)?;
        load_env_var("BATCH_COUNT", &mut config.batch_count)?;

        config.resolve();
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config.resolved())
    }
}
