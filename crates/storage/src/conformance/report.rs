use std::future::Future;

use lesson_report_core::SubmittingStatus;

use super::{make_report, TestResult};
use crate::{ReportStorage, StorageError};

pub(super) async fn run_report_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "report",
        "create_then_find_by_id_and_lesson",
        create_then_find_by_id_and_lesson(factory).await,
    ));
    results.push(TestResult::from_result(
        "report",
        "find_report_nonexistent",
        find_report_nonexistent(factory).await,
    ));
    results.push(TestResult::from_result(
        "report",
        "second_report_for_lesson_rejected",
        second_report_for_lesson_rejected(factory).await,
    ));
    results.push(TestResult::from_result(
        "report",
        "update_keeps_lesson_and_created_at",
        update_keeps_lesson_and_created_at(factory).await,
    ));
    results.push(TestResult::from_result(
        "report",
        "update_nonexistent",
        update_nonexistent(factory).await,
    ));
    results.push(TestResult::from_result(
        "report",
        "delete_removes_report",
        delete_removes_report(factory).await,
    ));

    results
}

async fn create_then_find_by_id_and_lesson<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    s.create_report(
        &mut snap,
        make_report("report-1", "lesson-1", SubmittingStatus::Saved),
    )
    .await
    .map_err(|e| format!("create: {e}"))?;
    let by_id = s
        .find_report(&mut snap, "report-1")
        .await
        .map_err(|e| format!("find_report: {e}"))?;
    let by_lesson = s
        .find_report_by_lesson(&mut snap, "lesson-1")
        .await
        .map_err(|e| format!("find_report_by_lesson: {e}"))?;
    let none = s
        .find_report_by_lesson(&mut snap, "lesson-2")
        .await
        .map_err(|e| format!("find_report_by_lesson lesson-2: {e}"))?;
    s.commit_snapshot(snap).await.map_err(|e| format!("commit: {e}"))?;

    if by_id.lesson_id != "lesson-1" || by_id.submitting_status != SubmittingStatus::Saved {
        return Err(format!("unexpected report {:?}", by_id));
    }
    match by_lesson {
        Some(r) if r.lesson_report_id == "report-1" => {}
        other => return Err(format!("expected report-1 by lesson, got {:?}", other)),
    }
    if none.is_some() {
        return Err(format!("expected no report for lesson-2, got {:?}", none));
    }
    Ok(())
}

async fn find_report_nonexistent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    let result = s.find_report(&mut snap, "report-999").await;
    let _ = s.abort_snapshot(snap).await;
    match result {
        Err(StorageError::ReportNotFound { lesson_report_id }) if lesson_report_id == "report-999" => {
            Ok(())
        }
        other => Err(format!("expected ReportNotFound, got {:?}", other)),
    }
}

async fn second_report_for_lesson_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    s.create_report(
        &mut snap,
        make_report("report-1", "lesson-1", SubmittingStatus::Submitted),
    )
    .await
    .map_err(|e| format!("create first: {e}"))?;
    s.commit_snapshot(snap).await.map_err(|e| format!("commit: {e}"))?;

    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin 2: {e}"))?;
    let result = s
        .create_report(
            &mut snap,
            make_report("report-2", "lesson-1", SubmittingStatus::Submitted),
        )
        .await;
    let _ = s.abort_snapshot(snap).await;
    match result {
        Err(StorageError::ReportAlreadyExists { lesson_id }) if lesson_id == "lesson-1" => Ok(()),
        other => Err(format!("expected ReportAlreadyExists, got {:?}", other)),
    }
}

async fn update_keeps_lesson_and_created_at<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    s.create_report(
        &mut snap,
        make_report("report-1", "lesson-1", SubmittingStatus::Saved),
    )
    .await
    .map_err(|e| format!("create: {e}"))?;

    let mut update = make_report("report-1", "lesson-2", SubmittingStatus::Submitted);
    update.created_at = "2030-01-01T00:00:00Z".to_string();
    update.updated_at = "2030-01-01T00:00:00Z".to_string();
    s.update_report(&mut snap, update)
        .await
        .map_err(|e| format!("update: {e}"))?;
    s.commit_snapshot(snap).await.map_err(|e| format!("commit: {e}"))?;

    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin 2: {e}"))?;
    let stored = s
        .find_report(&mut snap, "report-1")
        .await
        .map_err(|e| format!("find: {e}"))?;
    let _ = s.abort_snapshot(snap).await;

    if stored.submitting_status != SubmittingStatus::Submitted {
        return Err(format!("status not updated: {:?}", stored.submitting_status));
    }
    if stored.lesson_id != "lesson-1" {
        return Err(format!("lesson_id must not change, got {}", stored.lesson_id));
    }
    if stored.created_at != "2025-01-01T00:00:00Z" {
        return Err(format!("created_at must not change, got {}", stored.created_at));
    }
    if stored.updated_at != "2030-01-01T00:00:00Z" {
        return Err(format!("updated_at not updated, got {}", stored.updated_at));
    }
    Ok(())
}

async fn update_nonexistent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    let result = s
        .update_report(
            &mut snap,
            make_report("report-999", "lesson-1", SubmittingStatus::Saved),
        )
        .await;
    let _ = s.abort_snapshot(snap).await;
    match result {
        Err(StorageError::ReportNotFound { .. }) => Ok(()),
        other => Err(format!("expected ReportNotFound, got {:?}", other)),
    }
}

async fn delete_removes_report<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    s.create_report(
        &mut snap,
        make_report("report-1", "lesson-1", SubmittingStatus::Saved),
    )
    .await
    .map_err(|e| format!("create: {e}"))?;
    s.delete_report(&mut snap, "report-1")
        .await
        .map_err(|e| format!("delete: {e}"))?;
    let after = s
        .find_report_by_lesson(&mut snap, "lesson-1")
        .await
        .map_err(|e| format!("find_report_by_lesson: {e}"))?;
    let again = s.delete_report(&mut snap, "report-1").await;
    let _ = s.abort_snapshot(snap).await;

    if after.is_some() {
        return Err(format!("expected report gone, got {:?}", after));
    }
    match again {
        Err(StorageError::ReportNotFound { .. }) => Ok(()),
        other => Err(format!(
            "expected ReportNotFound on second delete, got {:?}",
            other
        )),
    }
}
