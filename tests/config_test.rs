use rask_log_influx::config::CONFIG_ENV;
use rask_log_influx::{Config, ConfigError, Precision};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

// Helper function to clean all environment variables before and after tests
fn clean_all_env_vars() {
    let env_vars = [
        CONFIG_ENV,
        "INFLUXDB_HOST",
        "INFLUXDB_PORT",
        "INFLUXDB_TIMEOUT",
        "INFLUXDB_BUCKET",
        "INFLUX_ORGANIZATION",
        "INFLUX_TOKEN",
        "INFLUXDB_HTTPS",
        "INFLUXDB_PRECISION",
        "SYSLOG_ENABLED",
        "SYSLOG_FACILITY",
        "SYSLOG_FACILITY_CODE",
        "SYSLOG_APP_NAME",
        "SYSLOG_APP_VERSION",
        "SYSLOG_MIN_LEVEL",
        "LOG_TAGS",
        "MEASUREMENT",
        "BATCH_INTERVAL",
        "BATCH_COUNT",
    ];

    unsafe {
        for var in &env_vars {
            env::remove_var(var);
        }
    }
}

#[test]
#[serial]
fn test_config_from_empty_environment_is_all_defaults() {
    clean_all_env_vars();

    let config = Config::from_env().unwrap();

    assert_eq!(config, Config::default().resolved());
}

#[test]
#[serial]
fn test_config_from_environment() {
    clean_all_env_vars();
    unsafe {
        env::set_var("INFLUXDB_HOST", "metrics.internal");
        env::set_var("INFLUXDB_PORT", "9086");
        env::set_var("INFLUXDB_TIMEOUT", "250");
        env::set_var("INFLUX_ORGANIZATION", "acme");
        env::set_var("INFLUX_TOKEN", "secret");
        env::set_var("INFLUXDB_HTTPS", "true");
        env::set_var("INFLUXDB_PRECISION", "ms");
        env::set_var("SYSLOG_ENABLED", "true");
        env::set_var("SYSLOG_FACILITY", "local0");
        env::set_var("SYSLOG_FACILITY_CODE", "16");
        env::set_var("SYSLOG_MIN_LEVEL", "error");
        env::set_var("LOG_TAGS", "service, region,,");
        env::set_var("BATCH_COUNT", "50");
    }

    let config = Config::from_env().unwrap();

    assert_eq!(config.host, "metrics.internal");
    assert_eq!(config.port, 9086);
    assert_eq!(config.timeout, Duration::from_millis(250));
    assert_eq!(config.organization, "acme");
    assert_eq!(config.token, "secret");
    assert!(config.use_https);
    assert_eq!(config.precision, Precision::Milliseconds);
    assert!(config.syslog);
    assert_eq!(config.facility, "local0");
    assert_eq!(config.facility_code, 16);
    assert_eq!(config.min_level, "error");
    assert_eq!(config.tags, vec!["service".to_string(), "region".to_string()]);
    assert_eq!(config.batch_count, 50);
    // Unset values still resolve
    assert_eq!(config.bucket, "logrus");
    assert_eq!(config.batch_interval_ms, 5000);

    clean_all_env_vars();
}

#[test]
#[serial]
fn test_invalid_environment_value_is_reported() {
    clean_all_env_vars();
    unsafe {
        env::set_var("INFLUXDB_PORT", "not-a-port");
    }

    let result = Config::from_env();

    match result {
        Err(ConfigError::EnvError(message)) => assert!(message.contains("INFLUXDB_PORT")),
        other => panic!("Expected EnvError, got {other:?}"),
    }

    clean_all_env_vars();
}

#[test]
#[serial]
fn test_inline_toml_environment_wins() {
    clean_all_env_vars();
    unsafe {
        env::set_var("INFLUXDB_HOST", "ignored");
        env::set_var(CONFIG_ENV, "influxdb_host = \"from-toml\"\nbatch_count = 7\n");
    }

    let config = Config::from_env().unwrap();

    assert_eq!(config.host, "from-toml");
    assert_eq!(config.batch_count, 7);
    assert_eq!(config.port, 8086);

    clean_all_env_vars();
}

#[test]
fn test_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
influxdb_host = "tsdb"
influxdb_port = 8087
influxdb_timeout = 500
influxdb_bucket = "services"
influx_organization = "acme"
influxdb_precision = "us"
syslog_min_level = "info"
log_tags = ["service", "pod"]
measurement = "events"
batch_interval = 1000
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.host, "tsdb");
    assert_eq!(config.port, 8087);
    assert_eq!(config.timeout, Duration::from_millis(500));
    assert_eq!(config.bucket, "services");
    assert_eq!(config.organization, "acme");
    assert_eq!(config.precision, Precision::Microseconds);
    assert_eq!(config.min_level, "info");
    assert_eq!(config.tags, vec!["service".to_string(), "pod".to_string()]);
    assert_eq!(config.measurement, "events");
    assert_eq!(config.batch_interval_ms, 1000);
    assert_eq!(config.batch_count, 200);
}

#[test]
fn test_missing_file_is_a_file_error() {
    let result = Config::from_file("/nonexistent/rask-log-influx.toml");

    assert!(matches!(result, Err(ConfigError::FileError(_))));
}

#[test]
fn test_malformed_toml_is_a_parse_error() {
    let result = Config::from_toml_str("influxdb_port = \"eighty\"");

    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_loaded_config_round_trips_through_toml() {
    let config = Config {
        tags: vec!["service".to_string()],
        syslog: true,
        ..Config::default()
    }
    .resolved();

    let text = toml::to_string(&config).unwrap();
    let reloaded = Config::from_toml_str(&text).unwrap();

    assert_eq!(reloaded, config);
}
