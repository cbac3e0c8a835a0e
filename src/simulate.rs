//! Simulated work: each task sleeps for a bounded, variable duration.

use crate::engine::{SinkWriter, WorkBody};
use crate::model::{TaskReport, WorkItem};
use crate::telemetry::metrics;
use crate::telemetry::work::record_outcome;
use opentelemetry::KeyValue;
use rand::Rng;
use std::time::Duration;
use tracing::{Span, debug, info};

/// How long a simulated task works.
#[derive(Debug, Clone, Copy)]
pub enum Pacing {
    /// `n * tick` with `n` drawn uniformly from `0..ticks`.
    Random { ticks: u32, tick: Duration },
    /// Always the same duration.
    Fixed(Duration),
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Random {
            ticks: 5,
            tick: Duration::from_secs(1),
        }
    }
}

impl Pacing {
    fn draw(&self) -> Duration {
        match *self {
            Pacing::Fixed(d) => d,
            Pacing::Random { ticks: 0, .. } => Duration::ZERO,
            Pacing::Random { ticks, tick } => tick * rand::thread_rng().gen_range(0..ticks),
        }
    }
}

/// Worker body that pretends to work on a [`WorkItem`].
#[derive(Debug, Clone, Default)]
pub struct SimulatedWork {
    pacing: Pacing,
}

impl SimulatedWork {
    pub fn new(pacing: Pacing) -> Self {
        Self { pacing }
    }
}

impl WorkBody for SimulatedWork {
    type Task = WorkItem;
    type Output = TaskReport;

    const KIND: &'static str = "simulate";

    async fn execute(&self, task: &mut WorkItem, sink: SinkWriter<TaskReport>) {
        if task.is_done() {
            debug!(id = task.id, "task already processed, skipping");
            record_outcome(&Span::current(), "skipped");
            metrics::results_emitted().add(
                1,
                &[
                    KeyValue::new("kind", Self::KIND),
                    KeyValue::new("outcome", "skipped"),
                ],
            );
            return;
        }

        let elapsed = self.pacing.draw();
        info!(id = task.id, "task running");
        tokio::time::sleep(elapsed).await;

        task.mark_done();
        info!(id = task.id, elapsed_ms = elapsed.as_millis() as u64, "task completed");
        record_outcome(&Span::current(), "ok");
        metrics::results_emitted().add(
            1,
            &[
                KeyValue::new("kind", Self::KIND),
                KeyValue::new("outcome", "ok"),
            ],
        );

        sink.emit(TaskReport {
            id: task.id,
            elapsed,
        })
        .await;
    }
}

/// Work items `1..=count`, none processed yet.
pub fn fresh_tasks(count: u64) -> Vec<WorkItem> {
    (1..=count).map(WorkItem::new).collect()
}
