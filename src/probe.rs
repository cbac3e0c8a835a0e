//! Endpoint probing: one GET per target, reported as a status line or an
//! error. No retries.

use crate::engine::{SinkWriter, WorkBody};
use crate::error::Result;
use crate::model::{ProbeOutcome, ProbeReport};
use crate::telemetry::metrics;
use crate::telemetry::work::record_outcome;
use opentelemetry::KeyValue;
use std::future::Future;
use std::time::Duration;
use tracing::{Span, debug, warn};

/// Endpoints checked when the caller supplies none.
pub const DEFAULT_TARGETS: &[&str] = &[
    "http://api.open-notify.org/astros.json",
    "https://catfact.ninja/fact",
];

/// Status line of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub code: u16,
    pub reason: String,
}

impl StatusLine {
    /// Status line with the canonical reason phrase for `code`.
    pub fn from_code(code: u16) -> Self {
        let reason = reqwest::StatusCode::from_u16(code)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self { code, reason }
    }
}

/// Performs a GET and reports the status line, or fails.
pub trait Transport: Send + Sync + 'static {
    fn get(&self, url: &str) -> impl Future<Output = Result<StatusLine>> + Send;
}

/// [`Transport`] over a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<StatusLine> {
        let response = self.client.get(url).send().await?;
        let status = StatusLine::from_code(response.status().as_u16());
        // Release the connection before reporting.
        drop(response);
        Ok(status)
    }
}

/// Worker body that probes one URL per task.
#[derive(Debug, Clone)]
pub struct EndpointProbe<T> {
    transport: T,
}

impl<T: Transport> EndpointProbe<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> WorkBody for EndpointProbe<T> {
    type Task = String;
    type Output = ProbeReport;

    const KIND: &'static str = "probe";

    async fn execute(&self, url: &mut String, sink: SinkWriter<ProbeReport>) {
        let outcome = match self.transport.get(url.as_str()).await {
            Ok(StatusLine { code, reason }) => {
                debug!(url = %url, code, "probe answered");
                ProbeOutcome::Status { code, reason }
            }
            Err(e) => {
                warn!(url = %url, error = %e, "probe failed");
                ProbeOutcome::Error {
                    detail: e.to_string(),
                }
            }
        };

        let label = match outcome {
            ProbeOutcome::Status { .. } => "ok",
            ProbeOutcome::Error { .. } => "error",
        };
        record_outcome(&Span::current(), label);
        metrics::results_emitted().add(
            1,
            &[
                KeyValue::new("kind", Self::KIND),
                KeyValue::new("outcome", label),
            ],
        );

        sink.emit(ProbeReport {
            url: url.clone(),
            outcome,
        })
        .await;
    }
}
