//! Snapshot lifecycle conformance tests.
//!
//! Verifies that committed writes are visible to later snapshots and that
//! aborted or dropped snapshots leave no trace. Snapshots are opened one
//! after another: a backend may serialize them.

use std::future::Future;

use lesson_report_core::SubmittingStatus;

use super::{make_detail, make_report, TestResult};
use crate::{LessonMemberRecord, MemberField, ReportStorage};

pub(super) async fn run_snapshot_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "snapshot",
        "committed_writes_visible",
        committed_writes_visible(factory).await,
    ));
    results.push(TestResult::from_result(
        "snapshot",
        "abort_discards_every_write",
        abort_discards_every_write(factory).await,
    ));
    results.push(TestResult::from_result(
        "snapshot",
        "dropped_snapshot_rolls_back",
        dropped_snapshot_rolls_back(factory).await,
    ));

    results
}

async fn committed_writes_visible<S, F, Fut>(factory: &F) -> Result<(), String>
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
    .map_err(|e| format!("create: {e}"))?;
    s.upsert_details(
        &mut snap,
        "report-1",
        vec![make_detail("detail-1", "report-1", "student-1")],
    )
    .await
    .map_err(|e| format!("upsert_details: {e}"))?;
    s.commit_snapshot(snap).await.map_err(|e| format!("commit: {e}"))?;

    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin 2: {e}"))?;
    let report = s
        .find_report_by_lesson(&mut snap, "lesson-1")
        .await
        .map_err(|e| format!("find_report_by_lesson: {e}"))?;
    let details = s
        .details_by_report(&mut snap, "report-1")
        .await
        .map_err(|e| format!("details_by_report: {e}"))?;
    let _ = s.abort_snapshot(snap).await;

    if report.is_none() {
        return Err("committed report not visible".to_string());
    }
    if details.len() != 1 {
        return Err(format!("expected 1 committed detail, got {}", details.len()));
    }
    Ok(())
}

async fn abort_discards_every_write<S, F, Fut>(factory: &F) -> Result<(), String>
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
    .map_err(|e| format!("create: {e}"))?;
    let mut member = LessonMemberRecord::new("lesson-1", "student-1");
    member.attendance_remark = "aborted".to_string();
    s.update_member_fields(&mut snap, vec![member], &MemberField::ATTENDANCE)
        .await
        .map_err(|e| format!("update_member_fields: {e}"))?;
    s.abort_snapshot(snap).await.map_err(|e| format!("abort: {e}"))?;

    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin 2: {e}"))?;
    let report = s
        .find_report_by_lesson(&mut snap, "lesson-1")
        .await
        .map_err(|e| format!("find_report_by_lesson: {e}"))?;
    let members = s
        .members_of_lesson(&mut snap, "lesson-1")
        .await
        .map_err(|e| format!("members_of_lesson: {e}"))?;
    let _ = s.abort_snapshot(snap).await;

    if report.is_some() {
        return Err("aborted report is visible".to_string());
    }
    if members.iter().any(|m| !m.attendance_remark.is_empty()) {
        return Err("aborted member update is visible".to_string());
    }
    Ok(())
}

async fn dropped_snapshot_rolls_back<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    {
        let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
        s.create_report(
            &mut snap,
            make_report("report-1", "lesson-1", SubmittingStatus::Saved),
        )
        .await
        .map_err(|e| format!("create: {e}"))?;
        drop(snap);
    }

    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin 2: {e}"))?;
    let report = s
        .find_report_by_lesson(&mut snap, "lesson-1")
        .await
        .map_err(|e| format!("find_report_by_lesson: {e}"))?;
    let _ = s.abort_snapshot(snap).await;

    match report {
        None => Ok(()),
        Some(r) => Err(format!("dropped snapshot leaked {:?}", r)),
    }
}
