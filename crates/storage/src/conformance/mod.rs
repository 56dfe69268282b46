//! Conformance test suite for lesson report storage backends.
//!
//! This module provides a backend-agnostic test suite that any
//! [`ReportStorage`] implementation can run to verify correctness. The suite
//! covers:
//!
//! - **Lookup**: lessons, learners, teachers and form configs from the fixture
//! - **Reports**: create/find/update/delete and the one-report-per-lesson rule
//! - **Details**: upsert keeps detail ids, field value upserts and deletes
//! - **Members**: masked attendance updates
//! - **Snapshots**: commit visibility, abort and drop roll back
//! - **Concurrency**: racing creates for one lesson yield exactly one report
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh storage instance seeded with [`Fixture::standard`]:
//!
//! ```ignore
//! use lesson_report_storage::conformance::{run_conformance_suite, Fixture};
//!
//! #[tokio::test]
//! async fn postgres_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         create_test_postgres_storage(&Fixture::standard()).await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod concurrent;
mod detail;
mod lookup;
mod member;
mod report;
mod snapshot;

use std::fmt;
use std::future::Future;

use lesson_report_core::{
    AttributeValue, LessonSchedulingStatus, SubmittingStatus, TeachingMethod,
    FEATURE_NAME_GROUP_LESSON_REPORT, FEATURE_NAME_INDIVIDUAL_LESSON_REPORT,
};

use crate::record::{
    FieldValueRecord, LessonMemberRecord, LessonRecord, LessonReportDetailRecord,
    LessonReportRecord, PartnerFormConfigRecord, TeacherRecord,
};
use crate::ReportStorage;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "report", "snapshot", "concurrent").
    pub category: String,
    /// Test name (e.g. "second_report_for_lesson_rejected").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test and must return a fresh
/// storage holding exactly the records of [`Fixture::standard`].
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: ReportStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(lookup::run_lookup_tests(&factory).await);
    results.extend(report::run_report_tests(&factory).await);
    results.extend(detail::run_detail_tests(&factory).await);
    results.extend(member::run_member_tests(&factory).await);
    results.extend(snapshot::run_snapshot_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Fixture ──────────────────────────────────────────────────────────────────

/// Reference data every backend under test must be seeded with.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub lessons: Vec<LessonRecord>,
    pub teachers: Vec<TeacherRecord>,
    pub form_configs: Vec<PartnerFormConfigRecord>,
    pub members: Vec<LessonMemberRecord>,
}

impl Fixture {
    /// - `lesson-1`: individual, published, unlocked; members student-1..3
    /// - `lesson-2`: group, published, locked; member student-1
    /// - `teacher-1` belongs to partner 1
    /// - partner 1 has an individual form config (`form-config-1`) and a
    ///   group form config with no sections (`form-config-2`)
    pub fn standard() -> Self {
        Self {
            lessons: vec![
                LessonRecord {
                    lesson_id: "lesson-1".into(),
                    teacher_id: "teacher-1".into(),
                    teaching_method: TeachingMethod::Individual,
                    scheduling_status: LessonSchedulingStatus::Published,
                    is_locked: false,
                },
                LessonRecord {
                    lesson_id: "lesson-2".into(),
                    teacher_id: "teacher-1".into(),
                    teaching_method: TeachingMethod::Group,
                    scheduling_status: LessonSchedulingStatus::Published,
                    is_locked: true,
                },
            ],
            teachers: vec![TeacherRecord {
                teacher_id: "teacher-1".into(),
                school_ids: vec![1],
            }],
            form_configs: vec![
                PartnerFormConfigRecord {
                    form_config_id: "form-config-1".into(),
                    partner_id: 1,
                    feature_name: FEATURE_NAME_INDIVIDUAL_LESSON_REPORT.into(),
                    form_config_data: serde_json::json!({
                        "sections": [{
                            "section_id": "section-1",
                            "fields": [
                                { "field_id": "attendance_status", "value_type": "VALUE_TYPE_STRING", "is_required": true },
                                { "field_id": "ordinal-number", "value_type": "VALUE_TYPE_INT", "is_required": true },
                                { "field_id": "title", "value_type": "VALUE_TYPE_STRING" }
                            ]
                        }]
                    }),
                },
                PartnerFormConfigRecord {
                    form_config_id: "form-config-2".into(),
                    partner_id: 1,
                    feature_name: FEATURE_NAME_GROUP_LESSON_REPORT.into(),
                    form_config_data: serde_json::Value::Null,
                },
            ],
            members: vec![
                LessonMemberRecord::new("lesson-1", "student-1"),
                LessonMemberRecord::new("lesson-1", "student-2"),
                LessonMemberRecord::new("lesson-1", "student-3"),
                LessonMemberRecord::new("lesson-2", "student-1"),
            ],
        }
    }
}

// ── Helpers: record constructors with sensible defaults ──────────────────────

fn make_report(id: &str, lesson_id: &str, status: SubmittingStatus) -> LessonReportRecord {
    LessonReportRecord {
        lesson_report_id: id.to_string(),
        lesson_id: lesson_id.to_string(),
        submitting_status: status,
        form_config_id: Some("form-config-1".to_string()),
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

fn make_detail(id: &str, report_id: &str, student_id: &str) -> LessonReportDetailRecord {
    LessonReportDetailRecord {
        lesson_report_detail_id: id.to_string(),
        lesson_report_id: report_id.to_string(),
        student_id: student_id.to_string(),
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

fn make_field_value(
    id: &str,
    detail_id: &str,
    field_id: &str,
    value: AttributeValue,
) -> FieldValueRecord {
    FieldValueRecord {
        dynamic_form_field_value_id: id.to_string(),
        lesson_report_detail_id: detail_id.to_string(),
        field_id: field_id.to_string(),
        value_type: value.kind().as_str().to_string(),
        value,
        field_render_guide: None,
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
    }
}
