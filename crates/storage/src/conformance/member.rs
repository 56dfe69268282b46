use std::future::Future;

use lesson_report_core::{AttendanceNotice, AttendanceReason, AttendanceStatus};

use super::TestResult;
use crate::{LessonMemberRecord, MemberField, ReportStorage};

pub(super) async fn run_member_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "member",
        "masked_update_touches_only_masked_columns",
        masked_update_touches_only_masked_columns(factory).await,
    ));
    results.push(TestResult::from_result(
        "member",
        "unknown_members_are_skipped",
        unknown_members_are_skipped(factory).await,
    ));

    results
}

fn filled_member(lesson_id: &str, user_id: &str) -> LessonMemberRecord {
    LessonMemberRecord {
        attendance_status: AttendanceStatus::Attend,
        attendance_remark: "on time".to_string(),
        attendance_notice: AttendanceNotice::InAdvance,
        attendance_reason: AttendanceReason::SchoolEvent,
        attendance_note: "note".to_string(),
        updated_at: "2030-01-01T00:00:00Z".to_string(),
        ..LessonMemberRecord::new(lesson_id, user_id)
    }
}

async fn masked_update_touches_only_masked_columns<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    s.update_member_fields(
        &mut snap,
        vec![filled_member("lesson-1", "student-1")],
        &MemberField::STATUS_AND_REMARK,
    )
    .await
    .map_err(|e| format!("update_member_fields: {e}"))?;
    s.commit_snapshot(snap).await.map_err(|e| format!("commit: {e}"))?;

    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin 2: {e}"))?;
    let members = s
        .members_of_lesson(&mut snap, "lesson-1")
        .await
        .map_err(|e| format!("members_of_lesson: {e}"))?;
    let other_lesson = s
        .members_of_lesson(&mut snap, "lesson-2")
        .await
        .map_err(|e| format!("members_of_lesson lesson-2: {e}"))?;
    let _ = s.abort_snapshot(snap).await;

    let updated = members
        .iter()
        .find(|m| m.user_id == "student-1")
        .ok_or("student-1 missing")?;
    if updated.attendance_status != AttendanceStatus::Attend
        || updated.attendance_remark != "on time"
    {
        return Err(format!("masked columns not written: {:?}", updated));
    }
    if !updated.attendance_notice.is_empty()
        || !updated.attendance_reason.is_empty()
        || !updated.attendance_note.is_empty()
    {
        return Err(format!("unmasked columns were written: {:?}", updated));
    }
    if updated.updated_at != "2030-01-01T00:00:00Z" {
        return Err(format!("updated_at not refreshed: {}", updated.updated_at));
    }
    if members
        .iter()
        .filter(|m| m.user_id != "student-1")
        .any(|m| !m.attendance_status.is_empty())
    {
        return Err("other members of lesson-1 changed".to_string());
    }
    if other_lesson.iter().any(|m| !m.attendance_status.is_empty()) {
        return Err("student-1 of lesson-2 changed".to_string());
    }
    Ok(())
}

async fn unknown_members_are_skipped<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    s.update_member_fields(
        &mut snap,
        vec![
            filled_member("lesson-1", "student-404"),
            filled_member("lesson-1", "student-2"),
        ],
        &MemberField::ATTENDANCE,
    )
    .await
    .map_err(|e| format!("update_member_fields: {e}"))?;
    let members = s
        .members_of_lesson(&mut snap, "lesson-1")
        .await
        .map_err(|e| format!("members_of_lesson: {e}"))?;
    let _ = s.abort_snapshot(snap).await;

    if members.len() != 3 {
        return Err(format!("unknown member must not be inserted, got {:?}", members));
    }
    let student_2 = members
        .iter()
        .find(|m| m.user_id == "student-2")
        .ok_or("student-2 missing")?;
    if student_2.attendance_notice != AttendanceNotice::InAdvance
        || student_2.attendance_note != "note"
    {
        return Err(format!("full attendance mask not applied: {:?}", student_2));
    }
    Ok(())
}
