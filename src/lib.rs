//! # fanout-rs
//!
//! Bounded-concurrency fan-out of independent work items.
//!
//! An [`engine::Executor`] dispatches one worker per task, caps how many run
//! at once with an admission gate, tracks outstanding workers, and publishes
//! each worker's result into a stream that closes once every worker has
//! exited. Two worker bodies ship with the crate: simulated work
//! ([`simulate`]) and HTTP endpoint probing ([`probe`]).

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod probe;
pub mod simulate;
pub mod telemetry;
