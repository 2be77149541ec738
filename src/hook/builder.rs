use super::HookError;
use crate::config::Config;
use crate::domain::log_entry::tag_text;
use crate::domain::{Entry, FieldValue, Point, Severity};
use crate::sender::line_protocol::unix_nanos;
use serde_json::Value;
use std::io;

/// Static fields of syslog-mode points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogFields {
    pub facility: String,
    pub facility_code: i64,
    pub app_name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Chronograf log viewer layout, independent of entry fields.
    Syslog(SyslogFields),
    /// Entry fields become point fields; `tag_keys` are promoted to tags.
    Freeform { tag_keys: Vec<String> },
}

/// Turns entries into points.
#[derive(Debug, Clone)]
pub struct PointBuilder {
    measurement: String,
    mode: Mode,
}

impl PointBuilder {
    pub fn new(measurement: impl Into<String>, mode: Mode) -> Self {
        Self {
            measurement: measurement.into(),
            mode,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mode = if config.syslog {
            Mode::Syslog(SyslogFields {
                facility: config.facility.clone(),
                facility_code: config.facility_code,
                app_name: config.app_name.clone(),
                version: config.version.clone(),
            })
        } else {
            Mode::Freeform {
                tag_keys: config.tags.clone(),
            }
        };
        Self::new(config.measurement.clone(), mode)
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn build(&self, entry: &Entry) -> Result<Point, HookError> {
        self.build_with_hostname(entry, local_hostname)
    }

    fn build_with_hostname<F>(&self, entry: &Entry, hostname: F) -> Result<Point, HookError>
    where
        F: FnOnce() -> io::Result<String>,
    {
        let measurement = entry
            .tag_value("measurement")
            .unwrap_or_else(|| self.measurement.clone());
        let mut point = Point::new(measurement, entry.time);

        match &self.mode {
            Mode::Syslog(syslog) => {
                let hostname = hostname().map_err(HookError::Hostname)?;
                let severity = Severity::from(entry.level);

                point.tags.insert("appname".into(), syslog.app_name.clone());
                point.tags.insert("facility".into(), syslog.facility.clone());
                point.tags.insert("host".into(), hostname.clone());
                point.tags.insert("hostname".into(), hostname);
                point.tags.insert("severity".into(), severity.name.into());

                point
                    .fields
                    .insert("facility_code".into(), syslog.facility_code.into());
                point
                    .fields
                    .insert("message".into(), entry.message.as_str().into());
                point
                    .fields
                    .insert("procid".into(), i64::from(std::process::id()).into());
                point
                    .fields
                    .insert("severity_code".into(), severity.code.into());
                point.fields.insert(
                    "timestamp".into(),
                    unix_nanos(&entry.time).into(),
                );
                point
                    .fields
                    .insert("version".into(), syslog.version.as_str().into());
            }
            Mode::Freeform { tag_keys } => {
                // A "message" field is overridden by the entry message
                let mut data = entry.fields.clone();
                data.insert("message".into(), Value::String(entry.message.clone()));

                // "level" and "logger" become tags without leaving the fields
                point.tags.insert("level".into(), entry.level.to_string());
                if let Some(logger) = data.get("logger").and_then(tag_text) {
                    point.tags.insert("logger".into(), logger);
                }

                point.fields = data
                    .iter()
                    .map(|(key, value)| (key.clone(), FieldValue::from(value)))
                    .collect();

                for key in tag_keys {
                    if let Some(value) = data.get(key).and_then(tag_text) {
                        point.tags.insert(key.clone(), value);
                        point.fields.remove(key);
                    }
                }
            }
        }

        Ok(point)
    }
}

fn local_hostname() -> io::Result<String> {
    hostname::get()?.into_string().map_err(|raw| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("host name is not valid UTF-8: {raw:?}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LogLevel;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn freeform(tag_keys: &[&str]) -> PointBuilder {
        PointBuilder::new(
            "logrus",
            Mode::Freeform {
                tag_keys: tag_keys.iter().map(|k| k.to_string()).collect(),
            },
        )
    }

    fn syslog() -> PointBuilder {
        PointBuilder::new(
            "syslog",
            Mode::Syslog(SyslogFields {
                facility: "local0".to_string(),
                facility_code: 16,
                app_name: "api".to_string(),
                version: "1.2.3".to_string(),
            }),
        )
    }

    #[test]
    fn test_freeform_promotes_configured_tags_and_keeps_logger_field() {
        let entry = Entry::new(LogLevel::Warning, "new")
            .with_field("a", 1)
            .with_field("message", "old")
            .with_field("logger", "svc");

        let point = freeform(&["a"]).build(&entry).unwrap();

        assert_eq!(point.measurement, "logrus");
        assert_eq!(point.tag("level"), Some("warning"));
        assert_eq!(point.tag("logger"), Some("svc"));
        assert_eq!(point.tag("a"), Some("1"));
        assert_eq!(point.tags.len(), 3);

        assert!(point.field("a").is_none());
        assert_eq!(point.field("message"), Some(&FieldValue::from("new")));
        assert_eq!(point.field("logger"), Some(&FieldValue::from("svc")));
        assert_eq!(point.fields.len(), 2);
        assert_eq!(point.timestamp, entry.time);
    }

    #[test]
    fn test_freeform_keeps_level_field_next_to_level_tag() {
        let entry = Entry::new(LogLevel::Error, "m").with_field("level", "custom");

        let point = freeform(&[]).build(&entry).unwrap();

        assert_eq!(point.tag("level"), Some("error"));
        assert_eq!(point.field("level"), Some(&FieldValue::from("custom")));
    }

    #[test]
    fn test_freeform_ignores_missing_and_compound_tag_keys() {
        let entry = Entry::new(LogLevel::Info, "m").with_field("ctx", json!({"id": 7}));

        let point = freeform(&["ctx", "absent"]).build(&entry).unwrap();

        assert!(point.tag("ctx").is_none());
        assert!(point.tag("absent").is_none());
        assert_eq!(
            point.field("ctx"),
            Some(&FieldValue::from(r#"{"id":7}"#))
        );
    }

    #[test]
    fn test_configured_tag_overrides_level_tag_and_leaves_fields() {
        let entry = Entry::new(LogLevel::Info, "m").with_field("level", "audit");

        let point = freeform(&["level", "message"]).build(&entry).unwrap();

        assert_eq!(point.tag("level"), Some("audit"));
        assert_eq!(point.tag("message"), Some("m"));
        assert!(point.fields.is_empty());
    }

    #[test]
    fn test_measurement_field_overrides_default_and_stays_a_field() {
        let entry = Entry::new(LogLevel::Info, "m").with_field("measurement", "custom");

        let point = freeform(&[]).build(&entry).unwrap();
        assert_eq!(point.measurement, "custom");
        assert_eq!(point.field("measurement"), Some(&FieldValue::from("custom")));

        let point = syslog().build_with_hostname(&entry, || Ok("h".into())).unwrap();
        assert_eq!(point.measurement, "custom");
    }

    #[test]
    fn test_syslog_point_layout() {
        let time = Utc.timestamp_opt(1_600_000_000, 42).unwrap();
        let entry = Entry::new(LogLevel::Fatal, "boom")
            .with_time(time)
            .with_field("ignored", true);

        let point = syslog()
            .build_with_hostname(&entry, || Ok("web-1".to_string()))
            .unwrap();

        assert_eq!(point.measurement, "syslog");
        assert_eq!(point.tag("appname"), Some("api"));
        assert_eq!(point.tag("facility"), Some("local0"));
        assert_eq!(point.tag("host"), Some("web-1"));
        assert_eq!(point.tag("hostname"), Some("web-1"));
        assert_eq!(point.tag("severity"), Some("crit"));
        assert_eq!(point.tags.len(), 5);

        assert_eq!(point.field("facility_code"), Some(&FieldValue::Integer(16)));
        assert_eq!(point.field("message"), Some(&FieldValue::from("boom")));
        assert_eq!(
            point.field("procid"),
            Some(&FieldValue::Integer(i64::from(std::process::id())))
        );
        assert_eq!(point.field("severity_code"), Some(&FieldValue::Integer(2)));
        assert_eq!(
            point.field("timestamp"),
            Some(&FieldValue::Integer(1_600_000_000_000_000_042))
        );
        assert_eq!(point.field("version"), Some(&FieldValue::from("1.2.3")));
        assert_eq!(point.fields.len(), 6);
        assert_eq!(point.timestamp, time);
    }

    #[test]
    fn test_syslog_timestamp_saturates_past_2262() {
        let time = Utc.with_ymd_and_hms(2300, 6, 1, 0, 0, 0).unwrap();
        let entry = Entry::new(LogLevel::Info, "m").with_time(time);

        let point = syslog()
            .build_with_hostname(&entry, || Ok("h".into()))
            .unwrap();

        assert_eq!(point.field("timestamp"), Some(&FieldValue::Integer(i64::MAX)));
    }

    #[test]
    fn test_syslog_hostname_failure_is_propagated() {
        let entry = Entry::new(LogLevel::Info, "m");

        let result = syslog().build_with_hostname(&entry, || {
            Err(io::Error::new(io::ErrorKind::NotFound, "no host"))
        });

        assert!(matches!(result, Err(HookError::Hostname(_))));
    }

    #[test]
    fn test_syslog_uses_machine_hostname() {
        let expected = hostname::get().unwrap().into_string().unwrap();
        let entry = Entry::new(LogLevel::Debug, "m");

        let point = syslog().build(&entry).unwrap();

        assert_eq!(point.tag("host"), Some(expected.as_str()));
        assert_eq!(point.tag("hostname"), Some(expected.as_str()));
        assert_eq!(point.field("severity_code"), Some(&FieldValue::Integer(7)));
    }
}
