use std::future::Future;
use std::sync::Arc;

use lesson_report_core::SubmittingStatus;

use super::{make_report, TestResult};
use crate::{ReportStorage, StorageError};

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_create_for_one_lesson_exactly_one_wins",
        concurrent_create_for_one_lesson_exactly_one_wins(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_create_for_different_lessons_all_succeed",
        concurrent_create_for_different_lessons_all_succeed(factory).await,
    ));

    results
}

// ── One lesson: exactly one report ──────────────────────────────────────────

/// N tasks each open a snapshot and create a report for lesson-1. Exactly
/// one commit succeeds; the rest must get ReportAlreadyExists.
async fn concurrent_create_for_one_lesson_exactly_one_wins<S, F, Fut>(
    factory: &F,
) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        handles.push(tokio::spawn(async move {
            let mut snap = s.begin_snapshot().await?;
            let result = s
                .create_report(
                    &mut snap,
                    make_report(&format!("report-{i}"), "lesson-1", SubmittingStatus::Submitted),
                )
                .await;
            match result {
                Ok(_) => {
                    s.commit_snapshot(snap).await?;
                    Ok(true)
                }
                Err(StorageError::ReportAlreadyExists { .. }) => {
                    s.abort_snapshot(snap).await?;
                    Ok(false)
                }
                Err(e) => {
                    let _ = s.abort_snapshot(snap).await;
                    Err(e)
                }
            }
        }));
    }

    let mut winners = 0usize;
    let mut losers = 0usize;
    for handle in handles {
        let won = handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StorageError| format!("storage error: {e}"))?;
        if won {
            winners += 1;
        } else {
            losers += 1;
        }
    }

    if winners != 1 {
        return Err(format!("expected exactly 1 winner, got {winners}"));
    }
    if losers != N - 1 {
        return Err(format!("expected {} losers, got {losers}", N - 1));
    }

    let mut snap = storage
        .begin_snapshot()
        .await
        .map_err(|e| format!("begin: {e}"))?;
    let stored = storage
        .find_report_by_lesson(&mut snap, "lesson-1")
        .await
        .map_err(|e| format!("find_report_by_lesson: {e}"))?;
    let _ = storage.abort_snapshot(snap).await;
    if stored.is_none() {
        return Err("winning report not visible".to_string());
    }

    Ok(())
}

// ── Different lessons: no false conflicts ───────────────────────────────────

async fn concurrent_create_for_different_lessons_all_succeed<S, F, Fut>(
    factory: &F,
) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        handles.push(tokio::spawn(async move {
            let mut snap = s.begin_snapshot().await?;
            s.create_report(
                &mut snap,
                make_report(
                    &format!("report-{i}"),
                    &format!("lesson-{i}"),
                    SubmittingStatus::Saved,
                ),
            )
            .await?;
            s.commit_snapshot(snap).await?;
            Ok::<(), StorageError>(())
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        handle
            .await
            .map_err(|e| format!("task {i} panic: {e}"))?
            .map_err(|e| format!("task {i} failed: {e}"))?;
    }

    let mut snap = storage
        .begin_snapshot()
        .await
        .map_err(|e| format!("begin: {e}"))?;
    for i in 0..N {
        let found = storage
            .find_report(&mut snap, &format!("report-{i}"))
            .await
            .map_err(|e| format!("find report-{i}: {e}"))?;
        if found.lesson_id != format!("lesson-{i}") {
            return Err(format!("report-{i}: wrong lesson {}", found.lesson_id));
        }
    }
    let _ = storage.abort_snapshot(snap).await;

    Ok(())
}
