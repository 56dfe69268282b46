//! lesson-report-core: domain types for schema-driven lesson reports.
//!
//! Everything in this crate is pure data plus the structural checks that
//! belong to the data itself. Persistence lives in `lesson-report-storage`,
//! orchestration in `lesson-report`.
//!
//! # Public API
//!
//! - [`AttributeValue`] / [`ValueKind`] -- typed dynamic field values
//! - [`FormConfig`] -- the partner-configurable report shape and its validation
//! - [`SystemDefinedField`] -- attendance fields reserved by the system
//! - Attendance enums and lifecycle enums ([`SubmittingStatus`],
//!   [`TeachingMethod`], [`LessonSchedulingStatus`])

pub mod attendance;
pub mod attribute;
pub mod error;
pub mod form_config;
pub mod status;

pub use attendance::{AttendanceNotice, AttendanceReason, AttendanceStatus};
pub use attribute::{AttributeValue, ValueKind};
pub use error::FormConfigError;
pub use form_config::{
    FormConfig, FormConfigData, FormConfigField, FormConfigSection, SystemDefinedField,
};
pub use status::{
    LessonSchedulingStatus, SubmittingStatus, TeachingMethod, FEATURE_NAME_GROUP_LESSON_REPORT,
    FEATURE_NAME_INDIVIDUAL_LESSON_REPORT,
};
