#![allow(dead_code)]

use rask_log_influx::Config;
use rask_log_influx::domain::Point;
use rask_log_influx::sender::{
    Client, ClientError, ERROR_CHANNEL_CAPACITY, ErrorReceiver, WriteApi, WriteError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady,
    Unreachable,
}

/// Everything the fake sink observed, shared between client and writer.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub points: Arc<Mutex<Vec<Point>>>,
    pub targets: Arc<Mutex<Vec<(String, String)>>>,
    pub flushes: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

impl Recorded {
    pub fn points(&self) -> Vec<Point> {
        self.points.lock().unwrap().clone()
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// In-memory sink that records points instead of sending them.
#[derive(Debug)]
pub struct FakeClient {
    readiness: Readiness,
    pub recorded: Recorded,
    pub built_from: Option<Config>,
    errors_tx: mpsc::Sender<WriteError>,
    errors_rx: Mutex<Option<ErrorReceiver>>,
}

impl FakeClient {
    pub fn new(readiness: Readiness) -> Self {
        let (errors_tx, errors_rx) = mpsc::channel(ERROR_CHANNEL_CAPACITY);
        Self {
            readiness,
            recorded: Recorded::default(),
            built_from: None,
            errors_tx,
            errors_rx: Mutex::new(Some(errors_rx)),
        }
    }

    pub fn ready() -> Self {
        Self::new(Readiness::Ready)
    }

    /// Simulates a background write failure.
    pub fn error_sender(&self) -> mpsc::Sender<WriteError> {
        self.errors_tx.clone()
    }
}

impl Client for FakeClient {
    type Writer = FakeWriter;

    fn from_config(config: &Config) -> Result<Self, ClientError> {
        let mut client = FakeClient::ready();
        client.built_from = Some(config.clone());
        Ok(client)
    }

    async fn ready(&self) -> Result<bool, ClientError> {
        match self.readiness {
            Readiness::Ready => Ok(true),
            Readiness::NotReady => Ok(false),
            Readiness::Unreachable => Err(ClientError::InvalidConfiguration(
                "connection refused".to_string(),
            )),
        }
    }

    fn write_api(&self, org: &str, bucket: &str) -> FakeWriter {
        self.recorded
            .targets
            .lock()
            .unwrap()
            .push((org.to_string(), bucket.to_string()));
        FakeWriter {
            recorded: self.recorded.clone(),
            errors: Mutex::new(self.errors_rx.lock().unwrap().take()),
        }
    }

    async fn close(&self) {
        self.recorded.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct FakeWriter {
    recorded: Recorded,
    errors: Mutex<Option<ErrorReceiver>>,
}

impl WriteApi for FakeWriter {
    fn write_point(&self, point: Point) {
        self.recorded.points.lock().unwrap().push(point);
    }

    async fn flush(&self) {
        self.recorded.flushes.fetch_add(1, Ordering::SeqCst);
    }

    fn take_errors(&self) -> Option<ErrorReceiver> {
        self.errors.lock().unwrap().take()
    }
}
