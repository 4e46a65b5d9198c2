//! Batch sequencing and failure-isolation properties, exercised through
//! `drive_batch` without a browser.

use std::sync::Mutex;
use std::time::Duration;

use bug_report_submit::error::{AppError, ErrorKind};
use bug_report_submit::models::BugReport;
use bug_report_submit::orchestrator::drive_batch;

fn batch_of(n: usize) -> Vec<BugReport> {
    (1..=n)
        .map(|i| BugReport::with_title(format!("Баг №{}", i)))
        .collect()
}

fn form_not_ready() -> AppError {
    AppError::FormNotReady {
        selector: "#ta_name".to_string(),
        timeout: Duration::from_secs(10),
    }
}

#[tokio::test]
async fn well_formed_batch_creates_every_item() {
    let bugs = batch_of(4);
    let result = drive_batch(&bugs, |_, _| async { Ok(()) }).await;

    assert_eq!(result.created, 4);
    assert!(result.is_clean());
    assert_eq!(result.attempted(), 4);
}

#[tokio::test]
async fn middle_failure_does_not_stop_the_batch() {
    let bugs = batch_of(3);
    let attempts = Mutex::new(Vec::new());

    let result = drive_batch(&bugs, |index, _| {
        let attempts = &attempts;
        async move {
            attempts.lock().unwrap().push(index);
            if index == 2 {
                Err(form_not_ready())
            } else {
                Ok(())
            }
        }
    })
    .await;

    // all three items were driven, in input order
    assert_eq!(*attempts.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(result.created, 2);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].index, 2);
    assert_eq!(result.failures[0].title, "Баг №2");
    assert_eq!(result.failures[0].kind, ErrorKind::FormNotReady);
}

#[tokio::test]
async fn items_run_strictly_in_input_order() {
    let bugs = batch_of(5);
    let seen = Mutex::new(Vec::new());

    drive_batch(&bugs, |index, bug| {
        let seen = &seen;
        let title = bug.title.clone();
        async move {
            seen.lock().unwrap().push((index, title));
            Ok(())
        }
    })
    .await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 5);
    for (i, (index, title)) in seen.iter().enumerate() {
        assert_eq!(*index, i + 1);
        assert_eq!(*title, format!("Баг №{}", i + 1));
    }
}

#[tokio::test]
async fn every_item_failing_still_reports_all_failures() {
    let bugs = batch_of(3);
    let result = drive_batch(&bugs, |_, _| async { Err(form_not_ready()) }).await;

    assert_eq!(result.created, 0);
    assert_eq!(result.failures.len(), 3);
    let indices: Vec<usize> = result.failures.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[tokio::test]
async fn navigation_failures_are_recorded_with_their_kind() {
    let bugs = batch_of(2);
    let result = drive_batch(&bugs, |index, _| async move {
        if index == 2 {
            Err(AppError::Navigation {
                url: "https://netronic.worksection.com/project/123/".to_string(),
                timeout: Duration::from_secs(30),
            })
        } else {
            Ok(())
        }
    })
    .await;

    assert_eq!(result.created, 1);
    assert_eq!(result.failures[0].kind, ErrorKind::Navigation);
}
