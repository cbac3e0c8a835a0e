//! Span helpers for runs and workers.

use tracing::Span;
use uuid::Uuid;

/// Span covering one executor run, from first dispatch to last spawn.
pub fn start_run_span(kind: &str, run_id: &Uuid, tasks: usize, capacity: usize) -> Span {
    tracing::info_span!(
        "fanout.run",
        "run.kind" = kind,
        "run.id" = %run_id,
        "run.tasks" = tasks,
        "run.capacity" = capacity,
    )
}

/// Span for a single worker. `worker.outcome` is filled by [`record_outcome`].
pub fn start_worker_span(kind: &str, task: &str) -> Span {
    tracing::info_span!(
        "fanout.worker",
        "worker.kind" = kind,
        "worker.task" = task,
        "worker.outcome" = tracing::field::Empty,
    )
}

/// Record how a worker finished ("ok", "error", "skipped") on its span.
pub fn record_outcome(span: &Span, outcome: &str) {
    span.record("worker.outcome", outcome);
}
