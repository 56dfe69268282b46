//! lesson-report-storage: the persistence contract behind the lesson report
//! engine.
//!
//! One capability trait per store ([`ReportStore`], [`ReportDetailStore`],
//! [`LessonMemberStore`], ...) all sharing the snapshot (transaction) type
//! declared by [`SnapshotStore`]. [`InMemoryStorage`] is the reference
//! backend; [`conformance`] checks any backend against the contract.

pub mod conformance;
mod error;
mod memory;
mod record;
mod traits;

pub use error::StorageError;
pub use memory::{InMemoryStorage, MemorySnapshot};
pub use record::{
    FieldValueRecord, LessonMemberRecord, LessonRecord, LessonReportDetailRecord,
    LessonReportRecord, MemberField, PartnerFormConfigRecord, TeacherRecord,
};
pub use traits::{
    FormConfigStore, LessonMemberStore, LessonStore, ReportDetailStore, ReportStorage,
    ReportStore, SnapshotStore, TeacherStore,
};
