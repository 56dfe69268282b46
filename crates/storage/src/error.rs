/// All errors that can be returned by a lesson report storage backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No lesson with the given id.
    #[error("lesson not found: {lesson_id}")]
    LessonNotFound { lesson_id: String },

    /// No teacher with the given id.
    #[error("teacher not found: {teacher_id}")]
    TeacherNotFound { teacher_id: String },

    /// No form config registered for the (partner, feature) pair.
    #[error("form config not found for partner {partner_id} and feature {feature_name}")]
    FormConfigNotFound {
        partner_id: i32,
        feature_name: String,
    },

    /// No lesson report with the given id.
    #[error("lesson report not found: {lesson_report_id}")]
    ReportNotFound { lesson_report_id: String },

    /// Unique violation: the lesson already has a lesson report. Backends
    /// must raise this from `create_report` so that concurrent creates for
    /// one lesson cannot both commit.
    #[error("lesson {lesson_id} already has a lesson report")]
    ReportAlreadyExists { lesson_id: String },

    /// A backend-specific storage error (DB connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::LessonNotFound { .. }
                | StorageError::TeacherNotFound { .. }
                | StorageError::FormConfigNotFound { .. }
                | StorageError::ReportNotFound { .. }
        )
    }
}
