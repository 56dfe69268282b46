//! lesson-report: the schema-driven lesson report engine.
//!
//! A [`LessonReport`] is a lesson plus one [`LessonReportDetail`] per
//! student. Its dynamic part is shaped by the partner's form config, which
//! the [`ReportEngine`] resolves, validates against, and persists through a
//! [`lesson_report_storage::ReportStorage`] backend inside one snapshot per
//! operation.
//!
//! # Public API
//!
//! - [`ReportEngine`] -- normalize, validate, submit, save draft, delete, load
//! - [`LessonReport`], [`LessonReportDetails`], [`LessonReportFields`] -- the aggregate
//! - [`WriteLessonReportRequest`] -- wire shape of a write request
//! - [`EngineConfig`] -- feature names and the lesson completion switch
//! - [`ReportError`], [`ValidationError`] -- error taxonomy

pub mod config;
pub mod detail;
pub mod engine;
pub mod error;
pub mod report;
pub mod request;

pub use config::EngineConfig;
pub use detail::{LessonReportDetail, LessonReportDetails, LessonReportField, LessonReportFields};
pub use engine::{GetDataOptions, LessonStatusUpdater, ReportEngine};
pub use error::{ReportError, ValidationError};
pub use report::LessonReport;
pub use request::{
    DynamicFieldValue, DynamicValue, WriteLessonReportDetail, WriteLessonReportRequest,
};
