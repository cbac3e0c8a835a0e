//! Execution engine: admission gate, completion tracker, result sink, and
//! the coordinator that ties them together.

pub mod executor;
pub mod gate;
pub mod sink;
pub mod tracker;

pub use executor::{Executor, Run, WorkBody};
pub use gate::{AdmissionGate, GatePermit};
pub use sink::{ResultStream, SinkWriter};
pub use tracker::{CompletionTracker, Registration};
