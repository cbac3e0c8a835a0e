//! Integration tests for the executor: result counts, closure, concurrency cap.

use fanout_rs::engine::{Executor, SinkWriter, WorkBody};
use fanout_rs::error::Error;
use fanout_rs::model::WorkItem;
use fanout_rs::simulate::{Pacing, SimulatedWork, fresh_tasks};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Body that records how many workers are inside it at once.
struct Occupancy {
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    hold: Duration,
}

impl Occupancy {
    fn new(hold: Duration) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            hold,
        }
    }
}

impl WorkBody for Occupancy {
    type Task = u64;
    type Output = u64;

    const KIND: &'static str = "occupancy";

    async fn execute(&self, task: &mut u64, sink: SinkWriter<u64>) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        sink.emit(*task).await;
    }
}

/// Body that panics on task 2.
struct Faulty;

impl WorkBody for Faulty {
    type Task = u64;
    type Output = u64;

    const KIND: &'static str = "faulty";

    async fn execute(&self, task: &mut u64, sink: SinkWriter<u64>) {
        if *task == 2 {
            panic!("task 2 blew up");
        }
        sink.emit(*task).await;
    }
}

/// Body whose task `n` takes `n * 50ms`.
struct Staggered;

impl WorkBody for Staggered {
    type Task = u64;
    type Output = u64;

    const KIND: &'static str = "staggered";

    async fn execute(&self, task: &mut u64, sink: SinkWriter<u64>) {
        tokio::time::sleep(Duration::from_millis(50 * *task)).await;
        sink.emit(*task).await;
    }
}

// ---------------------------------------------------------------------------
// Simulated work
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn serialized_when_capacity_is_one() {
    let executor = Executor::new(
        SimulatedWork::new(Pacing::Fixed(Duration::from_millis(100))),
        1,
    )
    .unwrap();

    let started = Instant::now();
    let (results, tasks) = executor.run(fresh_tasks(4)).complete().await.unwrap();

    assert_eq!(results.len(), 4);
    assert!(
        started.elapsed() >= Duration::from_millis(400),
        "capacity 1 should serialize work, took {:?}",
        started.elapsed()
    );
    assert!(tasks.iter().all(WorkItem::is_done));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_when_capacity_covers_all_tasks() {
    let executor = Executor::new(
        SimulatedWork::new(Pacing::Fixed(Duration::from_millis(100))),
        4,
    )
    .unwrap();

    let started = Instant::now();
    let (results, _) = executor.run(fresh_tasks(4)).complete().await.unwrap();

    assert_eq!(results.len(), 4);
    assert!(
        started.elapsed() < Duration::from_millis(300),
        "capacity 4 should run 4 tasks together, took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn every_task_reports_once() {
    for (count, cap) in [(1, 1), (2, 4), (4, 2), (4, 4)] {
        let executor =
            Executor::new(SimulatedWork::new(Pacing::Fixed(Duration::ZERO)), cap).unwrap();
        let (results, tasks) = executor
            .run(fresh_tasks(count))
            .complete()
            .await
            .unwrap();

        let ids: HashSet<u64> = results.iter().map(|r| r.id).collect();
        assert_eq!(results.len(), count as usize, "count={count} cap={cap}");
        assert_eq!(ids, (1..=count).collect::<HashSet<_>>());
        assert!(tasks.iter().all(WorkItem::is_done));
        assert_eq!(executor.gate().occupied(), 0);
    }
}

#[tokio::test]
async fn already_processed_tasks_are_skipped() {
    let executor = Executor::new(SimulatedWork::new(Pacing::Fixed(Duration::ZERO)), 2).unwrap();
    let tasks = vec![WorkItem::new(1), WorkItem::completed(2), WorkItem::new(3)];

    let (results, tasks) = executor.run(tasks).complete().await.unwrap();

    let ids: HashSet<u64> = results.iter().map(|r| r.id).collect();
    assert_eq!(ids, HashSet::from([1, 3]));
    assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(tasks.iter().all(WorkItem::is_done));
}

#[tokio::test]
async fn random_pacing_stays_within_bounds() {
    let pacing = Pacing::Random {
        ticks: 3,
        tick: Duration::from_millis(10),
    };
    let executor = Executor::new(SimulatedWork::new(pacing), 8).unwrap();
    let (results, _) = executor.run(fresh_tasks(8)).complete().await.unwrap();

    assert_eq!(results.len(), 8);
    for report in &results {
        assert!(report.elapsed < Duration::from_millis(30), "{report}");
        assert!(report.to_string().starts_with(&format!("Task {} completed in", report.id)));
    }
}

// ---------------------------------------------------------------------------
// Stream lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_task_list_closes_immediately() {
    let executor = Executor::new(SimulatedWork::default(), 3).unwrap();
    let mut run = executor.run(Vec::new());

    let next = tokio::time::timeout(Duration::from_secs(1), run.results().recv())
        .await
        .expect("closed stream must not block");
    assert!(next.is_none());
    assert!(run.finish().await.unwrap().is_empty());
}

#[tokio::test]
async fn drained_stream_stays_closed() {
    let executor = Executor::new(SimulatedWork::new(Pacing::Fixed(Duration::ZERO)), 2).unwrap();
    let mut run = executor.run(fresh_tasks(3));

    assert_eq!(run.results().collect().await.len(), 3);
    assert!(run.results().is_closed());

    for _ in 0..3 {
        let next = tokio::time::timeout(Duration::from_millis(100), run.results().recv())
            .await
            .expect("recv after closure must not block");
        assert!(next.is_none());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn results_arrive_before_slow_workers_finish() {
    let executor = Executor::new(Staggered, 4).unwrap();
    let mut run = executor.run(vec![1, 8]);

    let first = run.results().recv().await;
    assert_eq!(first, Some(1));
    assert!(
        !run.results().is_closed(),
        "task 8 is still running, the sink must stay open"
    );

    assert_eq!(run.results().recv().await, Some(8));
    assert_eq!(run.results().recv().await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn results_readable_while_dispatch_waits_on_a_full_gate() {
    let executor = Executor::new(
        SimulatedWork::new(Pacing::Fixed(Duration::from_millis(200))),
        1,
    )
    .unwrap();

    let started = Instant::now();
    let mut run = executor.run(fresh_tasks(4));
    assert!(
        started.elapsed() < Duration::from_millis(100),
        "run must hand back the stream before dispatch finishes, took {:?}",
        started.elapsed()
    );

    let first = run.results().recv().await.expect("first result");
    let first_at = started.elapsed();
    assert_eq!(first.id, 1);
    assert!(
        first_at < Duration::from_millis(400),
        "first result should be readable after about one task, read at {first_at:?}"
    );
    assert!(!run.results().is_closed(), "three tasks are still pending");

    let rest = run.results().collect().await;
    assert_eq!(rest.len(), 3);
    let tasks = run.finish().await.unwrap();
    assert!(tasks.iter().all(WorkItem::is_done));
}

#[tokio::test]
async fn panicking_worker_frees_its_slot_and_the_run_still_closes() {
    let executor = Executor::new(Faulty, 1).unwrap();
    let mut run = executor.run(vec![1, 2, 3]);

    let results = tokio::time::timeout(Duration::from_secs(2), run.results().collect())
        .await
        .expect("sink must close even when a worker panics");
    let ids: HashSet<u64> = results.into_iter().collect();
    assert_eq!(ids, HashSet::from([1, 3]));

    let err = run.finish().await.unwrap_err();
    assert!(matches!(err, Error::WorkerPanicked(_)));
    assert_eq!(executor.gate().occupied(), 0);
}

// ---------------------------------------------------------------------------
// Concurrency cap
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn running_workers_never_exceed_capacity() {
    const N: usize = 8;

    for cap in [1, N, N / 2, N + 3] {
        let body = Occupancy::new(Duration::from_millis(20));
        let peak = Arc::clone(&body.peak);
        let executor = Executor::new(body, cap).unwrap();

        let tasks: Vec<u64> = (0..N as u64).collect();
        let (results, _) = executor.run(tasks).complete().await.unwrap();

        assert_eq!(results.len(), N, "cap={cap}");
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= cap.min(N), "cap={cap} peak={peak}");
    }
}

#[test]
fn zero_capacity_executor_is_rejected() {
    let err = Executor::new(SimulatedWork::default(), 0).err().unwrap();
    assert!(matches!(err, Error::InvalidCapacity(0)));
}
