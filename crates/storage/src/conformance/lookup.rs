use std::future::Future;

use lesson_report_core::TeachingMethod;

use super::TestResult;
use crate::{ReportStorage, StorageError};

pub(super) async fn run_lookup_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "lookup",
        "find_lesson_returns_fixture_lesson",
        find_lesson_returns_fixture_lesson(factory).await,
    ));
    results.push(TestResult::from_result(
        "lookup",
        "find_lesson_nonexistent",
        find_lesson_nonexistent(factory).await,
    ));
    results.push(TestResult::from_result(
        "lookup",
        "learner_ids_follow_membership",
        learner_ids_follow_membership(factory).await,
    ));
    results.push(TestResult::from_result(
        "lookup",
        "find_teacher_and_nonexistent",
        find_teacher_and_nonexistent(factory).await,
    ));
    results.push(TestResult::from_result(
        "lookup",
        "form_config_by_partner_and_feature",
        form_config_by_partner_and_feature(factory).await,
    ));

    results
}

async fn find_lesson_returns_fixture_lesson<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    let lesson = s
        .find_lesson(&mut snap, "lesson-2")
        .await
        .map_err(|e| format!("find_lesson: {e}"))?;
    s.abort_snapshot(snap).await.map_err(|e| format!("abort: {e}"))?;

    if lesson.teaching_method != TeachingMethod::Group {
        return Err(format!(
            "expected group lesson, got {:?}",
            lesson.teaching_method
        ));
    }
    if !lesson.is_locked {
        return Err("expected lesson-2 to be locked".to_string());
    }
    Ok(())
}

async fn find_lesson_nonexistent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    let result = s.find_lesson(&mut snap, "lesson-404").await;
    let _ = s.abort_snapshot(snap).await;
    match result {
        Err(StorageError::LessonNotFound { lesson_id }) if lesson_id == "lesson-404" => Ok(()),
        other => Err(format!("expected LessonNotFound, got {:?}", other)),
    }
}

async fn learner_ids_follow_membership<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    let mut learners = s
        .learner_ids_of_lesson(&mut snap, "lesson-1")
        .await
        .map_err(|e| format!("learner_ids_of_lesson: {e}"))?;
    let unknown = s
        .learner_ids_of_lesson(&mut snap, "lesson-404")
        .await
        .map_err(|e| format!("learner_ids_of_lesson unknown: {e}"))?;
    s.abort_snapshot(snap).await.map_err(|e| format!("abort: {e}"))?;

    learners.sort();
    if learners != ["student-1", "student-2", "student-3"] {
        return Err(format!("unexpected learners {:?}", learners));
    }
    if !unknown.is_empty() {
        return Err(format!("expected no learners, got {:?}", unknown));
    }
    Ok(())
}

async fn find_teacher_and_nonexistent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    let teacher = s
        .find_teacher(&mut snap, "teacher-1")
        .await
        .map_err(|e| format!("find_teacher: {e}"))?;
    let missing = s.find_teacher(&mut snap, "teacher-404").await;
    let _ = s.abort_snapshot(snap).await;

    if teacher.school_ids != [1] {
        return Err(format!("expected school_ids [1], got {:?}", teacher.school_ids));
    }
    match missing {
        Err(StorageError::TeacherNotFound { .. }) => Ok(()),
        other => Err(format!("expected TeacherNotFound, got {:?}", other)),
    }
}

async fn form_config_by_partner_and_feature<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut snap = s.begin_snapshot().await.map_err(|e| format!("begin: {e}"))?;
    let found = s
        .find_by_partner_and_feature(&mut snap, 1, "FEATURE_NAME_GROUP_LESSON_REPORT")
        .await
        .map_err(|e| format!("find_by_partner_and_feature: {e}"))?;
    let missing = s
        .find_by_partner_and_feature(&mut snap, 2, "FEATURE_NAME_GROUP_LESSON_REPORT")
        .await;
    let _ = s.abort_snapshot(snap).await;

    if found.form_config_id != "form-config-2" {
        return Err(format!(
            "expected form-config-2, got {}",
            found.form_config_id
        ));
    }
    if !found.form_config_data.is_null() {
        return Err("expected null form config data".to_string());
    }
    match missing {
        Err(StorageError::FormConfigNotFound { partner_id: 2, .. }) => Ok(()),
        other => Err(format!("expected FormConfigNotFound, got {:?}", other)),
    }
}
