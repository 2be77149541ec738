//! `tracing` integration: every event becomes an [`Entry`] fired at a hook.

use crate::domain::{Entry, LogLevel};
use crate::hook::LogHook;
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Targets whose events are never forwarded: the sink itself and its HTTP
/// stack would otherwise feed their own diagnostics back into the sink.
const SKIPPED_TARGETS: &[&str] = &[
    "rask_log_influx",
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
];

/// Fires the wrapped hook for every event that reaches it.
///
/// The event's `message` field becomes the entry message; all other fields
/// keep their recorded type (strings, integers, floats, booleans), and
/// `Debug`-only values are rendered to text. Hook errors go to stderr.
pub struct InfluxLayer<H> {
    hook: Arc<H>,
}

impl<H: LogHook + 'static> InfluxLayer<H> {
    pub fn new(hook: Arc<H>) -> Self {
        Self { hook }
    }

    pub fn hook(&self) -> &Arc<H> {
        &self.hook
    }
}

impl<S, H> Layer<S> for InfluxLayer<H>
where
    S: Subscriber,
    H: LogHook + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_skipped(metadata.target()) {
            return;
        }

        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);

        let entry = Entry {
            time: Utc::now(),
            level: LogLevel::from(*metadata.level()),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        };

        if let Err(e) = self.hook.fire(&entry) {
            eprintln!("Failed to fire InfluxDB hook: {e}");
        }
    }
}

fn is_skipped(target: &str) -> bool {
    SKIPPED_TARGETS.iter().any(|skipped| {
        target
            .strip_prefix(skipped)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

#[derive(Default)]
struct EntryVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl EntryVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for EntryVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }
}
