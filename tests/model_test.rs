//! Display forms of work items and reports.

use fanout_rs::model::{TaskReport, WorkItem};
use std::time::Duration;

#[test]
fn task_report_prints_whole_and_sub_second_durations() {
    let report = TaskReport {
        id: 3,
        elapsed: Duration::from_secs(2),
    };
    assert_eq!(report.to_string(), "Task 3 completed in 2s");

    let report = TaskReport {
        id: 4,
        elapsed: Duration::from_millis(150),
    };
    assert_eq!(report.to_string(), "Task 4 completed in 150ms");
}

#[test]
fn zero_duration_prints_as_seconds() {
    let report = TaskReport {
        id: 1,
        elapsed: Duration::ZERO,
    };
    assert_eq!(report.to_string(), "Task 1 completed in 0s");
}

#[test]
fn work_item_done_flag_only_moves_forward() {
    let mut item = WorkItem::new(7);
    assert!(!item.is_done());
    item.mark_done();
    item.mark_done();
    assert!(item.is_done());
    assert!(WorkItem::completed(8).is_done());
    assert_eq!(item.to_string(), "task-7");
}
