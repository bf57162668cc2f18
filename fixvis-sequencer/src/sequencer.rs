use crate::buffer::{Push, ReorderBuffer, SequencerStats};
use fixvis_types::SequencedEvent;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Intake slots before `submit` starts applying backpressure.
pub const DEFAULT_INTAKE_CAPACITY: usize = 100;

/// How long `await_idle` waits for the worker by default.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Receives events from the worker, in sequence order.
///
/// Errors are logged by the worker and never stop delivery of later events.
pub trait EventHandler<T>: Send + 'static {
    fn handle(&mut self, event: T) -> anyhow::Result<()>;
}

impl<T, F> EventHandler<T> for F
where
    F: FnMut(T) -> anyhow::Result<()> + Send + 'static,
{
    fn handle(&mut self, event: T) -> anyhow::Result<()> {
        self(event)
    }
}

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("sequencer intake is closed")]
    Closed,

    #[error("sequencer worker failed: {0}")]
    Worker(String),
}

/// How `await_idle` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idle {
    /// The worker consumed every submission and exited.
    Drained(SequencerStats),
    /// The timeout elapsed first; the worker was abandoned.
    TimedOut,
}

impl Idle {
    pub fn is_drained(&self) -> bool {
        matches!(self, Idle::Drained(_))
    }
}

/// Multi-producer intake drained by a single ordering worker.
#[derive(Debug)]
pub struct Sequencer<T> {
    tx: Option<mpsc::Sender<SequencedEvent<T>>>,
    worker: JoinHandle<SequencerStats>,
}

/// Clonable producer side of a [`Sequencer`].
///
/// The worker only finishes once every handle has been dropped.
#[derive(Debug)]
pub struct SubmitHandle<T> {
    tx: mpsc::Sender<SequencedEvent<T>>,
}

impl<T> Clone for SubmitHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + 'static> SubmitHandle<T> {
    pub async fn submit(&self, event: T, sequence: i64) -> Result<(), SequencerError> {
        self.tx
            .send(SequencedEvent::new(event, sequence))
            .await
            .map_err(|_| SequencerError::Closed)
    }

    /// Blocking variant for producers outside the async runtime.
    ///
    /// Panics if called from within an async execution context.
    pub fn blocking_submit(&self, event: T, sequence: i64) -> Result<(), SequencerError> {
        self.tx
            .blocking_send(SequencedEvent::new(event, sequence))
            .map_err(|_| SequencerError::Closed)
    }
}

impl<T: Send + 'static> Sequencer<T> {
    /// Start the worker. Must be called from within a Tokio runtime.
    pub fn spawn<H: EventHandler<T>>(capacity: usize, handler: H) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(rx, handler));
        Self {
            tx: Some(tx),
            worker,
        }
    }

    pub async fn submit(&self, event: T, sequence: i64) -> Result<(), SequencerError> {
        let tx = self.tx.as_ref().ok_or(SequencerError::Closed)?;
        tx.send(SequencedEvent::new(event, sequence))
            .await
            .map_err(|_| SequencerError::Closed)
    }

    /// See [`SubmitHandle::blocking_submit`].
    pub fn blocking_submit(&self, event: T, sequence: i64) -> Result<(), SequencerError> {
        let tx = self.tx.as_ref().ok_or(SequencerError::Closed)?;
        tx.blocking_send(SequencedEvent::new(event, sequence))
            .map_err(|_| SequencerError::Closed)
    }

    pub fn handle(&self) -> Result<SubmitHandle<T>, SequencerError> {
        self.tx
            .as_ref()
            .map(|tx| SubmitHandle { tx: tx.clone() })
            .ok_or(SequencerError::Closed)
    }

    /// Stop accepting submissions through this sequencer.
    ///
    /// Handles obtained earlier keep the intake open until they are dropped.
    pub fn close(&mut self) {
        self.tx = None;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }

    /// Close the intake and wait for the worker to drain, at most `timeout`.
    ///
    /// On timeout the worker task is aborted so it cannot outlive this call.
    pub async fn await_idle(mut self, timeout: Duration) -> Result<Idle, SequencerError> {
        self.close();
        match tokio::time::timeout(timeout, &mut self.worker).await {
            Ok(Ok(stats)) => Ok(Idle::Drained(stats)),
            Ok(Err(err)) => Err(SequencerError::Worker(err.to_string())),
            Err(_) => {
                self.worker.abort();
                Ok(Idle::TimedOut)
            }
        }
    }
}

async fn run_worker<T, H>(mut rx: mpsc::Receiver<SequencedEvent<T>>, mut handler: H) -> SequencerStats
where
    H: EventHandler<T>,
{
    let mut buffer = ReorderBuffer::new();

    while let Some(SequencedEvent { event, sequence }) = rx.recv().await {
        match buffer.push(sequence, event) {
            Push::Ready(events) => {
                for event in events {
                    if let Err(err) = handler.handle(event) {
                        error!(error = %format!("{err:#}"), "error handling build event");
                    }
                }
            }
            Push::Held => {
                debug!(
                    sequence,
                    next_expected = buffer.next_expected(),
                    "holding out-of-order build event"
                );
            }
            Push::Duplicate(sequence) => {
                debug!(sequence, "duplicate sequence number");
            }
            Push::Invalid(sequence) => {
                warn!(sequence, "invalid sequence number, dropping build event");
            }
        }
    }

    let first_missing = buffer.next_expected();
    let first_pending = buffer.first_pending();
    let stats = buffer.finish();
    if stats.stranded > 0 {
        warn!(
            stranded = stats.stranded,
            first_missing,
            first_pending = ?first_pending,
            "build events never delivered: sequence gap at shutdown"
        );
    }
    debug!(
        delivered = stats.delivered,
        unordered = stats.unordered,
        duplicates = stats.duplicates,
        "build event worker finished"
    );
    stats
}
