//! Metric instrument factories.
//!
//! Instruments come from the `"fanout-rs"` meter on the global provider;
//! they are no-ops until a provider is installed.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("fanout-rs")
}

/// Counter: workers spawned by the coordinator.
/// Labels: `kind`.
pub fn tasks_dispatched() -> Counter<u64> {
    meter()
        .u64_counter("fanout.tasks.dispatched")
        .with_description("Number of workers dispatched")
        .build()
}

/// Counter: worker outcomes.
/// Labels: `kind`, `outcome` ("ok" | "error" | "skipped").
pub fn results_emitted() -> Counter<u64> {
    meter()
        .u64_counter("fanout.results.emitted")
        .with_description("Number of worker outcomes, including skips")
        .build()
}

/// Histogram: time the dispatch loop spent waiting for a gate slot.
/// Labels: `kind`.
pub fn gate_wait_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("fanout.gate.wait_ms")
        .with_description("Admission gate wait in milliseconds")
        .with_unit("ms")
        .build()
}
