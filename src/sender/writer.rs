use super::line_protocol;
use super::{ERROR_CHANNEL_CAPACITY, ErrorReceiver, WriteApi, WriteError};
use crate::config::Precision;
use crate::domain::Point;
use flate2::{Compression, write::GzEncoder};
use parking_lot::Mutex;
use reqwest::header::{AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// Batches larger than this are gzip-compressed on the wire.
const GZIP_MIN_POINTS: usize = 100;

enum Command {
    Write(Point),
    Flush(oneshot::Sender<()>),
}

/// Where and how one write handle sends its batches.
#[derive(Debug, Clone)]
pub(crate) struct WriteTarget {
    pub(crate) http: reqwest::Client,
    pub(crate) url: Url,
    pub(crate) token: String,
    pub(crate) precision: Precision,
}

impl WriteTarget {
    async fn write(&self, points: &[Point]) -> Result<(), WriteError> {
        let body = line_protocol::encode_batch(points, self.precision);
        if body.is_empty() {
            return Ok(());
        }

        let mut request = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8");
        if !self.token.is_empty() {
            request = request.header(AUTHORIZATION, format!("Token {}", self.token));
        }

        let payload = if points.len() > GZIP_MIN_POINTS {
            request = request.header(CONTENT_ENCODING, "gzip");
            let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
            encoder.write_all(body.as_bytes())?;
            encoder.finish()?
        } else {
            body.into_bytes()
        };

        let response = request.body(payload).send().await?;
        let status = response.status();
        if status.is_success() {
            debug!("Wrote {} points", points.len());
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(WriteError::HttpError {
            status: status.as_u16(),
            message,
        })
    }

    async fn write_pending(&self, pending: &mut Vec<Point>, errors: &mpsc::Sender<WriteError>) {
        if pending.is_empty() {
            return;
        }
        let batch = std::mem::take(pending);
        if let Err(e) = self.write(&batch).await {
            warn!("Failed to write batch of {} points: {}", batch.len(), e);
            report(errors, e);
        }
    }
}

fn report(errors: &mpsc::Sender<WriteError>, error: WriteError) {
    match errors.try_send(error) {
        Ok(()) => {}
        Err(TrySendError::Full(dropped)) => {
            warn!("Error channel full, dropping: {}", dropped);
        }
        // Nobody is listening
        Err(TrySendError::Closed(_)) => {}
    }
}

/// Write handle of [`HttpClient`](super::HttpClient).
///
/// Points go through an unbounded channel to a task that writes a batch when
/// `batch_size` points are pending or `flush_interval` has elapsed.
#[derive(Debug)]
pub struct HttpWriteApi {
    commands: mpsc::UnboundedSender<Command>,
    errors: Mutex<Option<ErrorReceiver>>,
}

impl HttpWriteApi {
    pub(crate) fn spawn(
        target: WriteTarget,
        batch_size: usize,
        flush_interval: Duration,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::channel(ERROR_CHANNEL_CAPACITY);

        let task = tokio::spawn(run(
            target,
            commands_rx,
            errors_tx,
            batch_size,
            flush_interval,
            shutdown,
        ));

        let write_api = Self {
            commands: commands_tx,
            errors: Mutex::new(Some(errors_rx)),
        };
        (write_api, task)
    }
}

impl WriteApi for HttpWriteApi {
    fn write_point(&self, point: Point) {
        if self.commands.send(Command::Write(point)).is_err() {
            debug!("Write task has stopped, dropping point");
        }
    }

    async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.commands.send(Command::Flush(ack_tx)).is_err() {
            return;
        }
        // A dropped ack means the task exited, having drained on the way out
        let _ = ack_rx.await;
    }

    fn take_errors(&self) -> Option<ErrorReceiver> {
        self.errors.lock().take()
    }
}

async fn run(
    target: WriteTarget,
    mut commands: mpsc::UnboundedReceiver<Command>,
    errors: mpsc::Sender<WriteError>,
    batch_size: usize,
    flush_interval: Duration,
    shutdown: CancellationToken,
) {
    let mut pending: Vec<Point> = Vec::with_capacity(batch_size);
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Write(point)) => {
                    pending.push(point);
                    if pending.len() >= batch_size {
                        target.write_pending(&mut pending, &errors).await;
                    }
                }
                Some(Command::Flush(ack)) => {
                    target.write_pending(&mut pending, &errors).await;
                    let _ = ack.send(());
                }
                None => break,
            },
            _ = ticker.tick() => {
                target.write_pending(&mut pending, &errors).await;
            }
            () = shutdown.cancelled() => break,
        }
    }

    // Drain whatever was enqueued before shutdown
    let mut acks = Vec::new();
    while let Ok(command) = commands.try_recv() {
        match command {
            Command::Write(point) => pending.push(point),
            Command::Flush(ack) => acks.push(ack),
        }
    }
    target.write_pending(&mut pending, &errors).await;
    for ack in acks {
        let _ = ack.send(());
    }
    debug!("Write task stopped");
}
