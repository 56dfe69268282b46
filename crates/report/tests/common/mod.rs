//! Shared fixture for engine integration tests.
//!
//! - `lesson-id-1`: individual, published, unlocked; members student-id-1..3
//!   (student-id-3 already marked late)
//! - `lesson-id-2`: group, published, locked; members student-id-1..2
//! - `lesson-id-3`: individual, canceled, unlocked; member student-id-1
//! - `teacher-id-1` belongs to partner 1, which has an individual and a
//!   group form config with the same fields

#![allow(dead_code)]

use std::sync::Arc;

use lesson_report::{
    EngineConfig, LessonReport, LessonReportDetail, LessonReportField, ReportEngine,
};
use lesson_report_core::{
    AttendanceStatus, AttributeValue, LessonSchedulingStatus, TeachingMethod,
    FEATURE_NAME_GROUP_LESSON_REPORT, FEATURE_NAME_INDIVIDUAL_LESSON_REPORT,
};
use lesson_report_storage::conformance::Fixture;
use lesson_report_storage::{
    InMemoryStorage, LessonMemberRecord, LessonRecord, PartnerFormConfigRecord, TeacherRecord,
};

pub const LESSON: &str = "lesson-id-1";
pub const LOCKED_LESSON: &str = "lesson-id-2";
pub const CANCELED_LESSON: &str = "lesson-id-3";
pub const INDIVIDUAL_FORM_CONFIG: &str = "form-config-individual";
pub const GROUP_FORM_CONFIG: &str = "form-config-group";

fn lesson(
    lesson_id: &str,
    teaching_method: TeachingMethod,
    scheduling_status: LessonSchedulingStatus,
    is_locked: bool,
) -> LessonRecord {
    LessonRecord {
        lesson_id: lesson_id.to_string(),
        teacher_id: "teacher-id-1".to_string(),
        teaching_method,
        scheduling_status,
        is_locked,
    }
}

fn form_config(form_config_id: &str, feature_name: &str) -> PartnerFormConfigRecord {
    PartnerFormConfigRecord {
        form_config_id: form_config_id.to_string(),
        partner_id: 1,
        feature_name: feature_name.to_string(),
        form_config_data: serde_json::json!({
            "sections": [
                {
                    "section_id": "section-attendance",
                    "section_name": "Attendance",
                    "fields": [
                        { "field_id": "attendance_status", "value_type": "VALUE_TYPE_STRING" },
                        { "field_id": "attendance_remark", "value_type": "VALUE_TYPE_STRING" }
                    ]
                },
                {
                    "section_id": "section-homework",
                    "fields": [
                        { "field_id": "ordinal-number", "value_type": "VALUE_TYPE_INT", "is_required": true },
                        { "field_id": "title", "value_type": "VALUE_TYPE_STRING", "label": { "en": "Title" } },
                        { "field_id": "tags", "value_type": "VALUE_TYPE_STRING_SET" }
                    ]
                }
            ]
        }),
    }
}

pub fn fixture() -> Fixture {
    let mut late = LessonMemberRecord::new(LESSON, "student-id-3");
    late.attendance_status = AttendanceStatus::Late;
    late.attendance_remark = "bus delay".to_string();

    Fixture {
        lessons: vec![
            lesson(
                LESSON,
                TeachingMethod::Individual,
                LessonSchedulingStatus::Published,
                false,
            ),
            lesson(
                LOCKED_LESSON,
                TeachingMethod::Group,
                LessonSchedulingStatus::Published,
                true,
            ),
            lesson(
                CANCELED_LESSON,
                TeachingMethod::Individual,
                LessonSchedulingStatus::Canceled,
                false,
            ),
        ],
        teachers: vec![TeacherRecord {
            teacher_id: "teacher-id-1".to_string(),
            school_ids: vec![1, 7],
        }],
        form_configs: vec![
            form_config(INDIVIDUAL_FORM_CONFIG, FEATURE_NAME_INDIVIDUAL_LESSON_REPORT),
            form_config(GROUP_FORM_CONFIG, FEATURE_NAME_GROUP_LESSON_REPORT),
        ],
        members: vec![
            LessonMemberRecord::new(LESSON, "student-id-1"),
            LessonMemberRecord::new(LESSON, "student-id-2"),
            late,
            LessonMemberRecord::new(LOCKED_LESSON, "student-id-1"),
            LessonMemberRecord::new(LOCKED_LESSON, "student-id-2"),
            LessonMemberRecord::new(CANCELED_LESSON, "student-id-1"),
        ],
    }
}

/// A freshly seeded storage. Also routes engine logs to the test output,
/// filtered by `RUST_LOG`.
pub fn storage() -> InMemoryStorage {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    InMemoryStorage::seeded(&fixture())
}

pub fn engine(storage: &InMemoryStorage) -> ReportEngine<InMemoryStorage> {
    ReportEngine::new(Arc::new(storage.clone()), EngineConfig::default())
}

// ── Details ──────────────────────────────────────────────────────────────────

/// Attendance plus every dynamic field.
pub fn full_detail(student_id: &str) -> LessonReportDetail {
    let mut detail = LessonReportDetail::new(student_id).with_fields(vec![
        LessonReportField::new("ordinal-number", AttributeValue::int(1)),
        LessonReportField::new("title", AttributeValue::string("Unit 1")),
        LessonReportField::new("tags", AttributeValue::string_set(["reading", "reading", "grammar"])),
    ]);
    detail.attendance_status = AttendanceStatus::Attend;
    detail.attendance_remark = "on time".to_string();
    detail
}

/// Only the required dynamic field.
pub fn minimal_detail(student_id: &str) -> LessonReportDetail {
    LessonReportDetail::new(student_id).with_fields(vec![LessonReportField::new(
        "ordinal-number",
        AttributeValue::int(2),
    )])
}

/// No dynamic fields at all, so the required one is missing.
pub fn bare_detail(student_id: &str) -> LessonReportDetail {
    let mut detail = LessonReportDetail::new(student_id);
    detail.attendance_status = AttendanceStatus::Absent;
    detail
}

pub fn report(lesson_id: &str, details: Vec<LessonReportDetail>) -> LessonReport {
    LessonReport::new(lesson_id).with_details(details)
}

pub fn member<'a>(members: &'a [LessonMemberRecord], user_id: &str) -> &'a LessonMemberRecord {
    members
        .iter()
        .find(|m| m.user_id == user_id)
        .unwrap_or_else(|| panic!("member {user_id} missing"))
}
