//! Lifecycle enums for reports and lessons, plus the default feature names
//! used to look up a partner's form config.

use serde::{Deserialize, Serialize};

pub const FEATURE_NAME_INDIVIDUAL_LESSON_REPORT: &str = "FEATURE_NAME_INDIVIDUAL_LESSON_REPORT";
pub const FEATURE_NAME_GROUP_LESSON_REPORT: &str = "FEATURE_NAME_GROUP_LESSON_REPORT";

/// Report lifecycle: `Saved` (draft) and `Submitted` are written by the
/// engine; `Approved` is only ever reached by an external reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmittingStatus {
    #[serde(rename = "LESSON_REPORT_SUBMITTING_STATUS_SAVED")]
    Saved,
    #[serde(rename = "LESSON_REPORT_SUBMITTING_STATUS_SUBMITTED")]
    Submitted,
    #[serde(rename = "LESSON_REPORT_SUBMITTING_STATUS_APPROVED")]
    Approved,
}

impl SubmittingStatus {
    pub fn is_draft(self) -> bool {
        self == SubmittingStatus::Saved
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeachingMethod {
    #[default]
    #[serde(rename = "LESSON_TEACHING_METHOD_INDIVIDUAL")]
    Individual,
    #[serde(rename = "LESSON_TEACHING_METHOD_GROUP")]
    Group,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LessonSchedulingStatus {
    #[serde(rename = "LESSON_SCHEDULING_STATUS_DRAFT")]
    Draft,
    #[default]
    #[serde(rename = "LESSON_SCHEDULING_STATUS_PUBLISHED")]
    Published,
    #[serde(rename = "LESSON_SCHEDULING_STATUS_COMPLETED")]
    Completed,
    #[serde(rename = "LESSON_SCHEDULING_STATUS_CANCELED")]
    Canceled,
}
