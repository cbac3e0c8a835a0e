//! Result sink: a bounded, closable fan-in channel.
//!
//! Writers are handed out one per worker; [`SinkWriter::emit`] consumes the
//! writer, so a worker publishes at most one result. The stream observes
//! closure only after every writer, including the coordinator's own, is gone.

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Create a sink sized for `capacity` results.
///
/// With one result per task and `capacity` equal to the task count,
/// producers never wait on the sink itself.
pub fn with_capacity<T>(capacity: usize) -> (SinkWriter<T>, ResultStream<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (SinkWriter { tx }, ResultStream { rx })
}

/// Producer handle for a single result.
#[derive(Debug)]
pub struct SinkWriter<T> {
    tx: mpsc::Sender<T>,
}

impl<T> SinkWriter<T> {
    /// Publish one result.
    ///
    /// A consumer that has already gone away is not an error for the worker;
    /// the result is dropped and logged.
    pub async fn emit(self, value: T) {
        if self.tx.send(value).await.is_err() {
            warn!("result stream dropped before worker emitted its result");
        }
    }

    /// Hand out another writer for a worker.
    pub(crate) fn fork(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }

    /// Drop the coordinator's writer. Once every worker's writer is also
    /// gone, the stream reports closure.
    pub(crate) fn close(self) {
        debug!("result sink closed");
    }
}

/// Consumer side of the sink.
#[derive(Debug)]
pub struct ResultStream<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> ResultStream<T> {
    /// Next result, or `None` once the sink is closed and drained.
    ///
    /// After `None`, every later call returns `None` without waiting.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Drain every remaining result until the sink closes.
    pub async fn collect(&mut self) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(value) = self.rx.recv().await {
            out.push(value);
        }
        out
    }

    /// True once no writer remains. Buffered results may still be readable.
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed()
    }
}
