//! Core data model.
//!
//! A work item is one unit of simulated work with an identity and a
//! completion flag. Reports are the values workers publish into the result
//! stream, one per processed task.

use serde::Serialize;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Work Item
// ---------------------------------------------------------------------------

/// A unit of work handed to the executor.
///
/// The `done` flag has a single writer: the worker that owns the item for the
/// duration of a run. It only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    pub id: u64,
    done: bool,
}

impl WorkItem {
    /// A fresh, unprocessed work item.
    pub fn new(id: u64) -> Self {
        Self { id, done: false }
    }

    /// A work item that has already been processed. Submitting it is a no-op.
    pub fn completed(id: u64) -> Self {
        Self { id, done: true }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Mark the item processed. Idempotent.
    pub fn mark_done(&mut self) {
        self.done = true;
    }
}

impl std::fmt::Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task-{}", self.id)
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Result of one simulated work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    pub id: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl std::fmt::Display for TaskReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Debug prints a zero Duration as "0ns".
        if self.elapsed.is_zero() {
            write!(f, "Task {} completed in 0s", self.id)
        } else {
            write!(f, "Task {} completed in {:?}", self.id, self.elapsed)
        }
    }
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Result of probing one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub url: String,
    pub outcome: ProbeOutcome,
}

/// What a probe observed. Transport failures are data, not faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The endpoint answered with a status line.
    Status { code: u16, reason: String },
    /// The request never produced a response.
    Error { detail: String },
}

impl ProbeReport {
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Error { .. })
    }
}

impl std::fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            ProbeOutcome::Status { code, reason } if reason.is_empty() => {
                write!(f, "{}: {code}", self.url)
            }
            ProbeOutcome::Status { code, reason } => write!(f, "{}: {code} {reason}", self.url),
            ProbeOutcome::Error { detail } => write!(f, "{}: ERROR ({detail})", self.url),
        }
    }
}
