//! Attendance attributes recorded per student.
//!
//! Each enum has an explicit `Empty` variant mirroring the wire default; an
//! `Empty` value counts as "not provided" everywhere the engine checks for
//! presence.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[default]
    #[serde(rename = "STUDENT_ATTEND_STATUS_EMPTY")]
    Empty,
    #[serde(rename = "STUDENT_ATTEND_STATUS_ATTEND")]
    Attend,
    #[serde(rename = "STUDENT_ATTEND_STATUS_ABSENT")]
    Absent,
    #[serde(rename = "STUDENT_ATTEND_STATUS_LATE")]
    Late,
    #[serde(rename = "STUDENT_ATTEND_STATUS_LEAVE_EARLY")]
    LeaveEarly,
    #[serde(rename = "STUDENT_ATTEND_STATUS_INFORMED_ABSENT")]
    InformedAbsent,
    #[serde(rename = "STUDENT_ATTEND_STATUS_INFORMED_LATE")]
    InformedLate,
    #[serde(rename = "STUDENT_ATTEND_STATUS_REALLOCATE")]
    Reallocate,
}

impl AttendanceStatus {
    pub fn is_empty(self) -> bool {
        self == AttendanceStatus::Empty
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceNotice {
    #[default]
    #[serde(rename = "NOTICE_EMPTY")]
    Empty,
    #[serde(rename = "IN_ADVANCE")]
    InAdvance,
    #[serde(rename = "ON_THE_DAY")]
    OnTheDay,
    #[serde(rename = "NO_CONTACT")]
    NoContact,
}

impl AttendanceNotice {
    pub fn is_empty(self) -> bool {
        self == AttendanceNotice::Empty
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceReason {
    #[default]
    #[serde(rename = "REASON_EMPTY")]
    Empty,
    #[serde(rename = "PHYSICAL_CONDITION")]
    PhysicalCondition,
    #[serde(rename = "SCHOOL_EVENT")]
    SchoolEvent,
    #[serde(rename = "FAMILY_REASON")]
    FamilyReason,
    #[serde(rename = "REASON_OTHER")]
    ReasonOther,
}

impl AttendanceReason {
    pub fn is_empty(self) -> bool {
        self == AttendanceReason::Empty
    }
}
