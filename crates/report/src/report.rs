use lesson_report_core::{FormConfig, SubmittingStatus};
use lesson_report_storage::LessonRecord;

use crate::detail::LessonReportDetails;

/// The lesson report aggregate: one per lesson, owning its details for the
/// span of one validate/persist cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonReport {
    /// `None` until the report is first persisted.
    pub lesson_report_id: Option<String>,
    pub lesson_id: String,
    /// Overrides the form config feature derived from the teaching method.
    pub feature_name: Option<String>,
    /// Filled by normalization.
    pub lesson: Option<LessonRecord>,
    pub submitting_status: Option<SubmittingStatus>,
    /// Resolved from the lesson's partner when not given.
    pub form_config: Option<FormConfig>,
    pub details: LessonReportDetails,
}

impl LessonReport {
    pub fn new(lesson_id: impl Into<String>) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            ..Self::default()
        }
    }

    pub fn with_report_id(mut self, lesson_report_id: impl Into<String>) -> Self {
        self.lesson_report_id = Some(lesson_report_id.into());
        self
    }

    pub fn with_feature_name(mut self, feature_name: impl Into<String>) -> Self {
        self.feature_name = Some(feature_name.into());
        self
    }

    pub fn with_form_config(mut self, form_config: FormConfig) -> Self {
        self.form_config = Some(form_config);
        self
    }

    pub fn with_details(mut self, details: impl Into<LessonReportDetails>) -> Self {
        self.details = details.into();
        self
    }

    /// A report without a status counts as a draft.
    pub fn is_draft(&self) -> bool {
        self.submitting_status.map_or(true, SubmittingStatus::is_draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::LessonReportDetail;

    #[test]
    fn builder_sets_identity_and_details() {
        let report = LessonReport::new("lesson-1")
            .with_report_id("report-1")
            .with_feature_name("FEATURE_NAME_GROUP_LESSON_REPORT")
            .with_details(vec![LessonReportDetail::new("student-1")]);

        assert_eq!(report.lesson_report_id.as_deref(), Some("report-1"));
        assert_eq!(
            report.feature_name.as_deref(),
            Some("FEATURE_NAME_GROUP_LESSON_REPORT")
        );
        assert_eq!(report.details.len(), 1);
        assert!(report.lesson.is_none());
    }

    #[test]
    fn draft_follows_status() {
        let mut report = LessonReport::new("lesson-1");
        assert!(report.is_draft());
        report.submitting_status = Some(SubmittingStatus::Submitted);
        assert!(!report.is_draft());
        report.submitting_status = Some(SubmittingStatus::Saved);
        assert!(report.is_draft());
    }
}
