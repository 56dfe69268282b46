use lesson_report_core::FormConfigError;
use lesson_report_storage::StorageError;

/// A lesson report that breaks one of its write-time rules. Every message
/// names the offending id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("lesson_id could not be empty")]
    EmptyLessonId,

    #[error("submitting_status could not be empty")]
    EmptySubmittingStatus,

    #[error("student_id could not be empty")]
    EmptyStudentId,

    #[error("field_id could not be empty")]
    EmptyFieldId,

    #[error("student id {0} is duplicated")]
    DuplicateStudentId(String),

    #[error("field id {0} is duplicated")]
    DuplicateFieldId(String),

    #[error("student {0} doesn't belong to lesson")]
    NotLessonLearner(String),

    #[error("field id {field_id} of student {student_id} not exist in form config")]
    FieldNotInFormConfig {
        field_id: String,
        student_id: String,
    },

    #[error("field id {field_id} of student {student_id} is not a dynamic field")]
    NotDynamicField {
        field_id: String,
        student_id: String,
    },

    #[error("system field id {field_id} of student {student_id} not exist in form config")]
    SystemFieldNotConfigured {
        field_id: String,
        student_id: String,
    },

    #[error("field {field_id} is required (student {student_id})")]
    RequiredField {
        field_id: String,
        student_id: String,
    },

    /// The teacher has no school, so no partner form config applies.
    #[error("teacher {0} does not belong to any school")]
    TeacherWithoutSchool(String),

    /// A wire field value arrived without any value set.
    #[error("field {field_id} of student {student_id} has no value")]
    MissingFieldValue {
        field_id: String,
        student_id: String,
    },
}

/// Errors returned by [`crate::ReportEngine`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    /// Lesson, teacher, form config or report missing.
    #[error("not found: {0}")]
    NotFound(StorageError),

    #[error("invalid lesson report: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid form config: {0}")]
    InvalidFormConfig(#[from] FormConfigError),

    /// The lesson already has a report and a final submit tried to create
    /// another one.
    #[error("lesson {lesson_id} must only have one lesson report")]
    Conflict { lesson_id: String },

    #[error("storage error: {0}")]
    Storage(StorageError),

    /// The report was committed but the lesson could not be marked
    /// completed.
    #[error("could not update lesson scheduling status: {0}")]
    LessonStatus(String),
}

impl From<StorageError> for ReportError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::ReportAlreadyExists { lesson_id } => ReportError::Conflict { lesson_id },
            e if e.is_not_found() => ReportError::NotFound(e),
            e => ReportError::Storage(e),
        }
    }
}
