use lesson_report_core::{
    AttendanceNotice, AttendanceReason, AttendanceStatus, AttributeValue, LessonSchedulingStatus,
    SubmittingStatus, TeachingMethod,
};
use serde::{Deserialize, Serialize};

/// A lesson as far as reporting is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub lesson_id: String,
    pub teacher_id: String,
    pub teaching_method: TeachingMethod,
    pub scheduling_status: LessonSchedulingStatus,
    /// A locked lesson (e.g. by timesheet approval) keeps its members'
    /// attendance untouched by report writes.
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherRecord {
    pub teacher_id: String,
    /// Partner (school) ids; the first one owns the teacher's form configs.
    pub school_ids: Vec<i32>,
}

/// A stored form config. `form_config_data` is the raw JSON document,
/// `null` when the partner has not configured any section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerFormConfigRecord {
    pub form_config_id: String,
    pub partner_id: i32,
    pub feature_name: String,
    pub form_config_data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonReportRecord {
    pub lesson_report_id: String,
    pub lesson_id: String,
    pub submitting_status: SubmittingStatus,
    pub form_config_id: Option<String>,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonReportDetailRecord {
    pub lesson_report_detail_id: String,
    pub lesson_report_id: String,
    pub student_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One dynamic field value of one report detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValueRecord {
    pub dynamic_form_field_value_id: String,
    pub lesson_report_detail_id: String,
    pub field_id: String,
    pub value: AttributeValue,
    /// Wire name of the value's kind, e.g. `VALUE_TYPE_INT`.
    pub value_type: String,
    pub field_render_guide: Option<serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
}

/// A student's membership in a lesson, carrying the attendance attributes
/// that report writes propagate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonMemberRecord {
    pub lesson_id: String,
    pub user_id: String,
    pub attendance_status: AttendanceStatus,
    pub attendance_remark: String,
    pub attendance_notice: AttendanceNotice,
    pub attendance_reason: AttendanceReason,
    pub attendance_note: String,
    pub updated_at: String,
}

impl LessonMemberRecord {
    /// A member with every attendance attribute empty.
    pub fn new(lesson_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            user_id: user_id.into(),
            attendance_status: AttendanceStatus::Empty,
            attendance_remark: String::new(),
            attendance_notice: AttendanceNotice::Empty,
            attendance_reason: AttendanceReason::Empty,
            attendance_note: String::new(),
            updated_at: String::new(),
        }
    }
}

/// Column mask for [`crate::LessonMemberStore::update_member_fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberField {
    AttendanceStatus,
    AttendanceRemark,
    AttendanceNotice,
    AttendanceReason,
    AttendanceNote,
}

impl MemberField {
    /// Every attendance column, as written by submit and save-draft.
    pub const ATTENDANCE: [MemberField; 5] = [
        MemberField::AttendanceRemark,
        MemberField::AttendanceStatus,
        MemberField::AttendanceNotice,
        MemberField::AttendanceReason,
        MemberField::AttendanceNote,
    ];

    /// The columns cleared when a report is deleted.
    pub const STATUS_AND_REMARK: [MemberField; 2] =
        [MemberField::AttendanceRemark, MemberField::AttendanceStatus];

    /// Copy this column from `source` onto `target`.
    pub fn apply(self, target: &mut LessonMemberRecord, source: &LessonMemberRecord) {
        match self {
            MemberField::AttendanceStatus => target.attendance_status = source.attendance_status,
            MemberField::AttendanceRemark => {
                target.attendance_remark = source.attendance_remark.clone()
            }
            MemberField::AttendanceNotice => target.attendance_notice = source.attendance_notice,
            MemberField::AttendanceReason => target.attendance_reason = source.attendance_reason,
            MemberField::AttendanceNote => target.attendance_note = source.attendance_note.clone(),
        }
    }
}
