//! Marking a lesson completed after a final submit.
//!
//! The engine asks its [`LessonStatusUpdater`] to complete the lesson only
//! when the switch is on, the report is final, every student has an
//! attendance status, and the lesson is neither canceled nor completed.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::*;
use lesson_report::{EngineConfig, LessonStatusUpdater, ReportEngine, ReportError};
use lesson_report_core::{AttendanceStatus, LessonSchedulingStatus};
use lesson_report_storage::InMemoryStorage;

#[derive(Default)]
struct RecordingUpdater {
    calls: Mutex<Vec<(String, LessonSchedulingStatus)>>,
    fail: bool,
}

impl RecordingUpdater {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<(String, LessonSchedulingStatus)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LessonStatusUpdater for RecordingUpdater {
    async fn update_scheduling_status(
        &self,
        lesson_id: &str,
        status: LessonSchedulingStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.calls
            .lock()
            .unwrap()
            .push((lesson_id.to_string(), status));
        if self.fail {
            return Err("lesson service unavailable".into());
        }
        Ok(())
    }
}

fn completing_engine(
    storage: &InMemoryStorage,
    updater: Arc<RecordingUpdater>,
    enabled: bool,
) -> ReportEngine<InMemoryStorage> {
    let config = EngineConfig {
        complete_lesson_on_full_attendance: enabled,
        ..EngineConfig::default()
    };
    ReportEngine::new(Arc::new(storage.clone()), config).with_lesson_status_updater(updater)
}

#[tokio::test]
async fn full_attendance_completes_lesson() {
    let storage = storage();
    let updater = Arc::new(RecordingUpdater::default());
    let engine = completing_engine(&storage, Arc::clone(&updater), true);
    assert!(engine.config().complete_lesson_on_full_attendance);

    let mut absent = minimal_detail("student-id-2");
    absent.attendance_status = AttendanceStatus::Absent;
    let submitted = engine
        .submit(report(LESSON, vec![full_detail("student-id-1"), absent]))
        .await
        .unwrap();

    assert_eq!(
        updater.calls(),
        vec![(LESSON.to_string(), LessonSchedulingStatus::Completed)]
    );
    assert_eq!(
        submitted.lesson.map(|l| l.scheduling_status),
        Some(LessonSchedulingStatus::Completed)
    );
}

#[tokio::test]
async fn missing_attendance_leaves_lesson_alone() {
    let storage = storage();
    let updater = Arc::new(RecordingUpdater::default());
    let engine = completing_engine(&storage, Arc::clone(&updater), true);

    engine
        .submit(report(
            LESSON,
            vec![full_detail("student-id-1"), minimal_detail("student-id-2")],
        ))
        .await
        .unwrap();
    assert!(updater.calls().is_empty());
}

#[tokio::test]
async fn disabled_switch_leaves_lesson_alone() {
    let storage = storage();
    let updater = Arc::new(RecordingUpdater::default());
    let engine = completing_engine(&storage, Arc::clone(&updater), false);

    engine
        .submit(report(LESSON, vec![full_detail("student-id-1")]))
        .await
        .unwrap();
    assert!(updater.calls().is_empty());
}

#[tokio::test]
async fn canceled_lesson_is_not_completed() {
    let storage = storage();
    let updater = Arc::new(RecordingUpdater::default());
    let engine = completing_engine(&storage, Arc::clone(&updater), true);

    let submitted = engine
        .submit(report(CANCELED_LESSON, vec![full_detail("student-id-1")]))
        .await
        .unwrap();
    assert!(updater.calls().is_empty());
    assert_eq!(
        submitted.lesson.map(|l| l.scheduling_status),
        Some(LessonSchedulingStatus::Canceled)
    );
}

#[tokio::test]
async fn draft_never_completes_lesson() {
    let storage = storage();
    let updater = Arc::new(RecordingUpdater::default());
    let engine = completing_engine(&storage, Arc::clone(&updater), true);

    engine
        .save_draft(report(LESSON, vec![full_detail("student-id-1")]))
        .await
        .unwrap();
    assert!(updater.calls().is_empty());
}

#[tokio::test]
async fn updater_failure_is_reported_after_commit() {
    let storage = storage();
    let updater = Arc::new(RecordingUpdater::failing());
    let engine = completing_engine(&storage, Arc::clone(&updater), true);

    let err = engine
        .submit(report(LESSON, vec![full_detail("student-id-1")]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ReportError::LessonStatus("lesson service unavailable".to_string())
    );
    assert_eq!(updater.calls().len(), 1);

    // The report itself stays committed.
    assert_eq!(storage.reports().await.len(), 1);
    let members = storage.members(LESSON).await;
    assert_eq!(
        member(&members, "student-id-1").attendance_status,
        AttendanceStatus::Attend
    );
}
