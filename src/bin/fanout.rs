//! fanout CLI: run simulated work or endpoint checks under a concurrency cap.

use clap::{Parser, Subcommand};
use fanout_rs::config::{self, Config};
use fanout_rs::engine::{Executor, WorkBody};
use fanout_rs::probe::{DEFAULT_TARGETS, EndpointProbe, HttpTransport};
use fanout_rs::simulate::{Pacing, SimulatedWork, fresh_tasks};
use fanout_rs::telemetry::{TelemetryConfig, init_telemetry};
use serde::Serialize;
use std::fmt::Display;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "fanout", about = "Bounded-concurrency task fan-out")]
struct Cli {
    /// Maximum concurrently running workers (overrides FANOUT_MAX_CONCURRENT)
    #[arg(long, global = true)]
    max_concurrent: Option<usize>,
    /// Print results as JSON lines
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run simulated work items
    Simulate {
        /// Number of work items
        #[arg(long, default_value_t = 8)]
        tasks: u64,
        /// Work a fixed number of milliseconds per task instead of 0-4s at random
        #[arg(long)]
        fixed_ms: Option<u64>,
    },
    /// Check the HTTP status of each URL
    Check {
        /// URLs to probe (defaults to two public demo endpoints)
        urls: Vec<String>,
        /// Per-request timeout in seconds (overrides FANOUT_PROBE_TIMEOUT_SECS)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "fanout".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let max_concurrent = cli.max_concurrent.unwrap_or(config.max_concurrent);

    match cli.command {
        Command::Simulate { tasks, fixed_ms } => {
            let pacing = match fixed_ms {
                Some(ms) => Pacing::Fixed(Duration::from_millis(ms)),
                None => Pacing::default(),
            };
            let executor = Executor::new(SimulatedWork::new(pacing), max_concurrent)?;
            drain(&executor, fresh_tasks(tasks), cli.json).await
        }
        Command::Check { urls, timeout_secs } => {
            let timeout = timeout_secs
                .map(config::probe_timeout_secs)
                .transpose()?
                .unwrap_or(config.probe_timeout);
            let urls = if urls.is_empty() {
                DEFAULT_TARGETS.iter().map(|s| s.to_string()).collect()
            } else {
                urls
            };
            let executor = Executor::new(
                EndpointProbe::new(HttpTransport::new(timeout)?),
                max_concurrent,
            )?;
            drain(&executor, urls, cli.json).await
        }
    }
}

/// Dispatch `tasks` and print every result as it arrives.
async fn drain<B>(executor: &Executor<B>, tasks: Vec<B::Task>, json: bool) -> anyhow::Result<()>
where
    B: WorkBody,
    B::Output: Display + Serialize,
{
    let started = Instant::now();
    let total = tasks.len();
    let mut run = executor.run(tasks);

    let mut received = 0usize;
    while let Some(result) = run.results().recv().await {
        received += 1;
        if json {
            println!("{}", serde_json::to_string(&result)?);
        } else {
            println!("{result}");
        }
    }

    run.finish().await?;

    let summary = format!(
        "{received} result(s) from {total} task(s) in {:.2?}",
        started.elapsed()
    );
    if json {
        eprintln!("{summary}");
    } else {
        println!("\n{summary}");
    }
    Ok(())
}
