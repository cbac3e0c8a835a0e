//! Coordinator: dispatches one worker per task under the admission gate.
//!
//! A dispatcher task walks the list in order: register with the completion
//! tracker, acquire a gate slot, spawn the worker. After the last dispatch a
//! background closer waits for the tracker to drain and closes the sink.

use crate::engine::gate::{AdmissionGate, GatePermit};
use crate::engine::sink::{self, ResultStream, SinkWriter};
use crate::engine::tracker::{CompletionTracker, Registration};
use crate::error::Result;
use crate::telemetry::metrics;
use crate::telemetry::work::{start_run_span, start_worker_span};
use opentelemetry::KeyValue;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info};
use uuid::Uuid;

/// The per-task unit of execution.
///
/// An implementation publishes at most one result by consuming `sink`.
/// Returning without emitting is a skip; the coordinator still counts the
/// worker as finished.
pub trait WorkBody: Send + Sync + 'static {
    type Task: Display + Send + 'static;
    type Output: Send + 'static;

    /// Short name used in spans and metric labels.
    const KIND: &'static str;

    fn execute(
        &self,
        task: &mut Self::Task,
        sink: SinkWriter<Self::Output>,
    ) -> impl Future<Output = ()> + Send;
}

/// Runs work bodies across concurrent workers, at most `capacity` at a time.
pub struct Executor<B: WorkBody> {
    body: Arc<B>,
    gate: Arc<AdmissionGate>,
}

impl<B: WorkBody> Executor<B> {
    /// Build an executor with a fixed concurrency cap (`>= 1`).
    pub fn new(body: B, max_concurrent: usize) -> Result<Self> {
        Ok(Self {
            body: Arc::new(body),
            gate: Arc::new(AdmissionGate::new(max_concurrent)?),
        })
    }

    pub fn capacity(&self) -> usize {
        self.gate.capacity()
    }

    pub fn gate(&self) -> &Arc<AdmissionGate> {
        &self.gate
    }

    /// Start dispatching every task and return the run handle at once.
    ///
    /// The dispatch loop runs on its own task and waits on the gate whenever
    /// all slots are taken, so results are readable from [`Run::results`]
    /// while later tasks are still queued.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(&self, tasks: Vec<B::Task>) -> Run<B::Task, B::Output> {
        let run_id = Uuid::new_v4();
        let span = start_run_span(B::KIND, &run_id, tasks.len(), self.capacity());
        let (writer, results) = sink::with_capacity(tasks.len());

        let dispatcher = tokio::spawn(
            dispatch(Arc::clone(&self.body), Arc::clone(&self.gate), tasks, writer)
                .instrument(span),
        );

        Run {
            run_id,
            results,
            dispatcher,
        }
    }
}

async fn dispatch<B: WorkBody>(
    body: Arc<B>,
    gate: Arc<AdmissionGate>,
    tasks: Vec<B::Task>,
    writer: SinkWriter<B::Output>,
) -> Vec<JoinHandle<B::Task>> {
    let tracker = Arc::new(CompletionTracker::new());
    let mut workers = Vec::with_capacity(tasks.len());

    info!(tasks = tasks.len(), "dispatch started");

    for task in tasks {
        let registration = tracker.register();

        let wait_start = Instant::now();
        let permit = gate.acquire().await;
        metrics::gate_wait_ms().record(
            wait_start.elapsed().as_secs_f64() * 1000.0,
            &[KeyValue::new("kind", B::KIND)],
        );
        metrics::tasks_dispatched().add(1, &[KeyValue::new("kind", B::KIND)]);

        let worker_span = start_worker_span(B::KIND, &task.to_string());
        debug!(task = %task, occupied = gate.occupied(), "worker dispatched");

        let handle = tokio::spawn(
            run_worker(Arc::clone(&body), task, writer.fork(), permit, registration)
                .instrument(worker_span),
        );
        workers.push(handle);
    }

    // Every worker is registered by now, so zero means finished.
    tokio::spawn(close_when_drained(tracker, writer).in_current_span());

    workers
}

async fn run_worker<B: WorkBody>(
    body: Arc<B>,
    mut task: B::Task,
    writer: SinkWriter<B::Output>,
    permit: GatePermit,
    registration: Registration,
) -> B::Task {
    body.execute(&mut task, writer).await;

    // The writer is gone; free the slot, then count this worker out.
    drop(permit);
    drop(registration);
    task
}

async fn close_when_drained<T>(tracker: Arc<CompletionTracker>, writer: SinkWriter<T>) {
    tracker.wait().await;
    writer.close();
    info!("all workers finished");
}

/// Handle to an in-flight run.
pub struct Run<T, R> {
    pub run_id: Uuid,
    results: ResultStream<R>,
    dispatcher: JoinHandle<Vec<JoinHandle<T>>>,
}

impl<T, R> Run<T, R> {
    /// The result stream. Ends once every worker has exited.
    pub fn results(&mut self) -> &mut ResultStream<R> {
        &mut self.results
    }

    /// Wait for every worker and take the tasks back, in dispatch order.
    ///
    /// Fails if a worker body panicked; that worker's task is lost.
    pub async fn finish(self) -> Result<Vec<T>> {
        let workers = self.dispatcher.await?;
        let mut tasks = Vec::with_capacity(workers.len());
        for handle in workers {
            tasks.push(handle.await?);
        }
        Ok(tasks)
    }

    /// Drain the result stream, then take the tasks back.
    pub async fn complete(mut self) -> Result<(Vec<R>, Vec<T>)> {
        let results = self.results.collect().await;
        let tasks = self.finish().await?;
        Ok((results, tasks))
    }
}
