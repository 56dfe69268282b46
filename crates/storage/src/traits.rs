use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{
    FieldValueRecord, LessonMemberRecord, LessonRecord, LessonReportDetailRecord,
    LessonReportRecord, MemberField, PartnerFormConfigRecord, TeacherRecord,
};

/// Snapshot (transaction) lifecycle shared by every capability store.
///
/// ## Snapshot Semantics
///
/// Every store method takes `&mut Self::Snapshot`, a type representing an
/// in-progress transaction. The lifecycle is:
///
/// 1. `begin_snapshot()`: start a transaction, returns a `Snapshot`
/// 2. Call store methods with `&mut snapshot`
/// 3. `commit_snapshot(snapshot)`: commit and consume the transaction
///    OR `abort_snapshot(snapshot)`: roll back and consume the transaction
///
/// If a `Snapshot` is dropped without committing, the underlying transaction
/// MUST be rolled back. This is how cancellation works: dropping an
/// in-flight engine future drops its snapshot.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so a single storage can
/// be shared behind an `Arc` across request handlers.
#[async_trait]
pub trait SnapshotStore: Send + Sync + 'static {
    /// The snapshot (transaction) type used by this storage backend.
    type Snapshot: Send;

    /// Begin a new snapshot (transaction).
    async fn begin_snapshot(&self) -> Result<Self::Snapshot, StorageError>;

    /// Commit a snapshot, making all mutations durable.
    async fn commit_snapshot(&self, snapshot: Self::Snapshot) -> Result<(), StorageError>;

    /// Abort (roll back) a snapshot, discarding all mutations.
    async fn abort_snapshot(&self, snapshot: Self::Snapshot) -> Result<(), StorageError>;
}

/// Lookup of partner form configs.
#[async_trait]
pub trait FormConfigStore: SnapshotStore {
    /// Returns `Err(StorageError::FormConfigNotFound)` when the partner has
    /// no form config for `feature_name`.
    async fn find_by_partner_and_feature(
        &self,
        snapshot: &mut Self::Snapshot,
        partner_id: i32,
        feature_name: &str,
    ) -> Result<PartnerFormConfigRecord, StorageError>;
}

#[async_trait]
pub trait LessonStore: SnapshotStore {
    /// Returns `Err(StorageError::LessonNotFound)` if the lesson does not exist.
    async fn find_lesson(
        &self,
        snapshot: &mut Self::Snapshot,
        lesson_id: &str,
    ) -> Result<LessonRecord, StorageError>;

    /// Ids of the students enrolled in the lesson. Empty for an unknown lesson.
    async fn learner_ids_of_lesson(
        &self,
        snapshot: &mut Self::Snapshot,
        lesson_id: &str,
    ) -> Result<Vec<String>, StorageError>;
}

#[async_trait]
pub trait TeacherStore: SnapshotStore {
    /// Returns `Err(StorageError::TeacherNotFound)` if the teacher does not exist.
    async fn find_teacher(
        &self,
        snapshot: &mut Self::Snapshot,
        teacher_id: &str,
    ) -> Result<TeacherRecord, StorageError>;
}

/// Lesson report rows. At most one report exists per lesson.
#[async_trait]
pub trait ReportStore: SnapshotStore {
    /// Insert a new report row.
    ///
    /// Returns `Err(StorageError::ReportAlreadyExists)` if the lesson already
    /// has a report. This check must hold across concurrent snapshots (unique
    /// constraint on `lesson_id` or equivalent).
    async fn create_report(
        &self,
        snapshot: &mut Self::Snapshot,
        record: LessonReportRecord,
    ) -> Result<LessonReportRecord, StorageError>;

    /// Overwrite status, form config id and `updated_at` of an existing row.
    /// `lesson_id` and `created_at` are never changed.
    ///
    /// Returns `Err(StorageError::ReportNotFound)` if the row does not exist.
    async fn update_report(
        &self,
        snapshot: &mut Self::Snapshot,
        record: LessonReportRecord,
    ) -> Result<LessonReportRecord, StorageError>;

    /// Returns `Err(StorageError::ReportNotFound)` if the row does not exist.
    async fn find_report(
        &self,
        snapshot: &mut Self::Snapshot,
        lesson_report_id: &str,
    ) -> Result<LessonReportRecord, StorageError>;

    async fn find_report_by_lesson(
        &self,
        snapshot: &mut Self::Snapshot,
        lesson_id: &str,
    ) -> Result<Option<LessonReportRecord>, StorageError>;

    /// Returns `Err(StorageError::ReportNotFound)` if the row does not exist.
    async fn delete_report(
        &self,
        snapshot: &mut Self::Snapshot,
        lesson_report_id: &str,
    ) -> Result<(), StorageError>;
}

/// Report details and their dynamic field values.
#[async_trait]
pub trait ReportDetailStore: SnapshotStore {
    /// Make `details` the detail set of the report.
    ///
    /// An existing `(lesson_report_id, student_id)` pair keeps its stored
    /// `lesson_report_detail_id`; new pairs are inserted with the id they
    /// carry; details of the report whose student is not listed are removed
    /// together with their field values.
    async fn upsert_details(
        &self,
        snapshot: &mut Self::Snapshot,
        lesson_report_id: &str,
        details: Vec<LessonReportDetailRecord>,
    ) -> Result<(), StorageError>;

    async fn details_by_report(
        &self,
        snapshot: &mut Self::Snapshot,
        lesson_report_id: &str,
    ) -> Result<Vec<LessonReportDetailRecord>, StorageError>;

    /// Insert or replace values keyed by `(lesson_report_detail_id, field_id)`.
    async fn upsert_field_values(
        &self,
        snapshot: &mut Self::Snapshot,
        values: Vec<FieldValueRecord>,
    ) -> Result<(), StorageError>;

    async fn field_values_by_details(
        &self,
        snapshot: &mut Self::Snapshot,
        detail_ids: &[String],
    ) -> Result<Vec<FieldValueRecord>, StorageError>;

    async fn delete_details_by_report(
        &self,
        snapshot: &mut Self::Snapshot,
        lesson_report_id: &str,
    ) -> Result<(), StorageError>;

    async fn delete_field_values_by_details(
        &self,
        snapshot: &mut Self::Snapshot,
        detail_ids: &[String],
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait LessonMemberStore: SnapshotStore {
    async fn members_of_lesson(
        &self,
        snapshot: &mut Self::Snapshot,
        lesson_id: &str,
    ) -> Result<Vec<LessonMemberRecord>, StorageError>;

    /// For each given member that exists (matched on `lesson_id` + `user_id`),
    /// copy the masked columns plus `updated_at`. Unknown members are
    /// skipped.
    async fn update_member_fields(
        &self,
        snapshot: &mut Self::Snapshot,
        members: Vec<LessonMemberRecord>,
        fields: &[MemberField],
    ) -> Result<(), StorageError>;
}

/// Everything the report engine needs, behind one snapshot type.
pub trait ReportStorage:
    FormConfigStore + LessonStore + TeacherStore + ReportStore + ReportDetailStore + LessonMemberStore
{
}

impl<T> ReportStorage for T where
    T: FormConfigStore
        + LessonStore
        + TeacherStore
        + ReportStore
        + ReportDetailStore
        + LessonMemberStore
{
}
