//! A single spawned task draining a bounded queue into a [`Consumer`].
//!
//! Submitting never waits: a full queue is reported to the producer, which
//! in ichor is a delegate handler running inside a request.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

/// Owned by the worker task; never shared, so it needs no locking.
#[async_trait]
pub trait Consumer: Send + 'static {
    type Task: Send + 'static;

    async fn consume(&mut self, task: Self::Task);

    /// Runs every [`WorkerConfig::tick`] while the worker is idle or busy.
    async fn tick(&mut self) {}

    /// Runs once, after the queue has been emptied on stop.
    async fn finish(&mut self) {}
}

/// Reasons a task was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("worker queue is full")]
    Full,
    #[error("worker is stopped")]
    Closed,
}

/// Cloneable, non-blocking producer side of a worker's queue.
pub struct TaskSender<T> {
    tx: mpsc::Sender<T>,
}

impl<T> Clone for TaskSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + 'static> TaskSender<T> {
    /// Queues `task` without waiting.
    ///
    /// # Errors
    ///
    /// [`SubmitError::Full`] if the queue is at capacity, [`SubmitError::Closed`]
    /// once the worker has stopped.
    pub fn try_submit(&self, task: T) -> Result<(), SubmitError> {
        self.tx.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SubmitError::Full,
            mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
        })
    }
}

/// Queue capacity and tick interval of a [`Worker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    pub capacity: usize,
    pub tick: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            tick: Duration::from_secs(60),
        }
    }
}

/// Handle to the spawned task. Tasks submitted before [`Worker::stop`] are
/// all consumed before [`Consumer::finish`] runs.
pub struct Worker<C: Consumer> {
    tx: mpsc::Sender<C::Task>,
    stop_tx: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl<C: Consumer> Worker<C> {
    /// Spawns the worker. Must be called inside a tokio runtime.
    pub fn start(mut consumer: C, config: WorkerConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<C::Task>(config.capacity.max(1));
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.tick);
            // The first tick completes immediately; skip it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    task = rx.recv() => match task {
                        Some(task) => consumer.consume(task).await,
                        None => break,
                    },
                    _ = ticker.tick() => consumer.tick().await,
                    _ = &mut stop_rx => break,
                }
            }

            rx.close();
            let mut leftover = 0_usize;
            while let Some(task) = rx.recv().await {
                consumer.consume(task).await;
                leftover += 1;
            }
            debug!(leftover, "worker consumed remaining tasks");
            consumer.finish().await;
        });

        Self {
            tx,
            stop_tx: Some(stop_tx),
            join: Some(join),
        }
    }

    /// A producer handle for this worker's queue.
    #[must_use]
    pub fn sender(&self) -> TaskSender<C::Task> {
        TaskSender {
            tx: self.tx.clone(),
        }
    }

    /// Queues `task` without waiting.
    ///
    /// # Errors
    ///
    /// See [`TaskSender::try_submit`].
    pub fn try_submit(&self, task: C::Task) -> Result<(), SubmitError> {
        self.sender().try_submit(task)
    }

    /// Signals the task and waits for it. Calling twice is a no-op.
    pub async fn stop(&mut self) {
        if let Some(stop) = self.stop_tx.take() {
            // Err means the task already ended on its own.
            let _ = stop.send(());
        }
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                tracing::error!(error = %e, "worker task panicked");
            }
        }
    }
}
