//! Lesson report orchestration over a [`ReportStorage`] backend.
//!
//! Every mutating operation runs inside exactly one storage snapshot. The
//! plain operations (`submit`, `save_draft`, `delete`) open their own
//! snapshot and commit it on success or abort it on the first error; the
//! `*_in` variants take part in a snapshot owned by the caller, who then
//! decides whether to commit. Dropping an operation's future drops its
//! snapshot, which the backend rolls back.
//!
//! Write path (submit and save-draft share it):
//! 1. Resolve identity: an existing report id pins the lesson id; without
//!    one, a draft adopts the lesson's existing report while a final submit
//!    is rejected with [`ReportError::Conflict`]
//! 2. [`ReportEngine::normalize`] then [`ReportEngine::is_valid`]
//! 3. Create or update the report row, drop the report's previous field
//!    values, upsert details, re-read them for their ids, write the new
//!    field values, and write attendance through to the lesson members
//!    unless the lesson is locked

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lesson_report_core::{FormConfig, LessonSchedulingStatus, SubmittingStatus};
use lesson_report_storage::{
    LessonMemberRecord, LessonRecord, LessonReportRecord, MemberField, ReportStorage,
    SnapshotStore, StorageError,
};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::detail::{fields_by_detail_id, LessonReportDetails};
use crate::error::{ReportError, ValidationError};
use crate::report::LessonReport;

/// The lesson service that owns a lesson's scheduling status.
#[async_trait]
pub trait LessonStatusUpdater: Send + Sync {
    async fn update_scheduling_status(
        &self,
        lesson_id: &str,
        status: LessonSchedulingStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Which parts of a stored report [`ReportEngine::get_data`] loads. The
/// default loads everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetDataOptions {
    pub form_config: bool,
    pub details: bool,
    /// Only honored when details are loaded.
    pub field_values: bool,
}

impl Default for GetDataOptions {
    fn default() -> Self {
        Self {
            form_config: true,
            details: true,
            field_values: true,
        }
    }
}

impl GetDataOptions {
    pub fn ignore_form_config(mut self) -> Self {
        self.form_config = false;
        self
    }

    pub fn ignore_details(mut self) -> Self {
        self.details = false;
        self
    }

    pub fn ignore_field_values(mut self) -> Self {
        self.field_values = false;
        self
    }
}

pub struct ReportEngine<S: ReportStorage> {
    storage: Arc<S>,
    config: EngineConfig,
    lesson_status: Option<Arc<dyn LessonStatusUpdater>>,
}

impl<S: ReportStorage> ReportEngine<S> {
    pub fn new(storage: Arc<S>, config: EngineConfig) -> Self {
        Self {
            storage,
            config,
            lesson_status: None,
        }
    }

    pub fn with_lesson_status_updater(mut self, updater: Arc<dyn LessonStatusUpdater>) -> Self {
        self.lesson_status = Some(updater);
        self
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Normalization and validation ────────────────────────────────────

    /// Default the status to `Saved`, load the lesson, resolve the form
    /// config when the report carries none, and normalize the details.
    pub async fn normalize(
        &self,
        snapshot: &mut S::Snapshot,
        report: &mut LessonReport,
    ) -> Result<(), ReportError> {
        if report.submitting_status.is_none() {
            report.submitting_status = Some(SubmittingStatus::Saved);
        }
        if report.lesson_id.is_empty() {
            return Err(ValidationError::EmptyLessonId.into());
        }

        let lesson = self.storage.find_lesson(snapshot, &report.lesson_id).await?;
        if report.form_config.is_none() {
            let form_config = self
                .resolve_form_config(snapshot, &lesson, report.feature_name.as_deref())
                .await?;
            report.form_config = Some(form_config);
        }
        report.lesson = Some(lesson);
        report.details.normalize();
        Ok(())
    }

    /// Check a normalized report. Required field values are only enforced
    /// when `is_draft` is false.
    pub async fn is_valid(
        &self,
        snapshot: &mut S::Snapshot,
        report: &LessonReport,
        is_draft: bool,
    ) -> Result<(), ReportError> {
        if report.lesson_id.is_empty() {
            return Err(ValidationError::EmptyLessonId.into());
        }
        if report.submitting_status.is_none() {
            return Err(ValidationError::EmptySubmittingStatus.into());
        }

        let learner_ids = self
            .storage
            .learner_ids_of_lesson(snapshot, &report.lesson_id)
            .await?;
        report.details.only_have_learner_ids(&learner_ids)?;

        let allow_fields = match &report.form_config {
            Some(config) => {
                config.is_valid()?;
                config.fields_by_id()
            }
            None => HashMap::new(),
        };
        report.details.only_have_allow_fields(&allow_fields)?;
        report.details.is_valid()?;

        if !is_draft {
            let required = report
                .form_config
                .as_ref()
                .map(FormConfig::required_fields_by_id)
                .unwrap_or_default();
            report.details.validate_required_fields_value(&required)?;
        }
        Ok(())
    }

    // ── Submit / save draft ─────────────────────────────────────────────

    /// Final submit in a snapshot of its own. After the commit the lesson is
    /// marked completed when configured to and every student attended.
    pub async fn submit(&self, report: LessonReport) -> Result<LessonReport, ReportError> {
        let mut snapshot = self.storage.begin_snapshot().await?;
        let result = self.submit_in(&mut snapshot, report).await;
        let mut report = self.settle(snapshot, result).await?;
        info!(
            lesson_report_id = report.lesson_report_id.as_deref().unwrap_or_default(),
            lesson_id = %report.lesson_id,
            details = report.details.len(),
            "lesson report submitted"
        );
        self.complete_lesson_if_attended(&mut report).await?;
        Ok(report)
    }

    /// Draft save in a snapshot of its own. Saving twice for one lesson
    /// resolves to the same report.
    pub async fn save_draft(&self, report: LessonReport) -> Result<LessonReport, ReportError> {
        let mut snapshot = self.storage.begin_snapshot().await?;
        let result = self.save_draft_in(&mut snapshot, report).await;
        let report = self.settle(snapshot, result).await?;
        info!(
            lesson_report_id = report.lesson_report_id.as_deref().unwrap_or_default(),
            lesson_id = %report.lesson_id,
            details = report.details.len(),
            "lesson report draft saved"
        );
        Ok(report)
    }

    pub async fn submit_in(
        &self,
        snapshot: &mut S::Snapshot,
        report: LessonReport,
    ) -> Result<LessonReport, ReportError> {
        self.write_in(snapshot, report, SubmittingStatus::Submitted)
            .await
    }

    pub async fn save_draft_in(
        &self,
        snapshot: &mut S::Snapshot,
        report: LessonReport,
    ) -> Result<LessonReport, ReportError> {
        self.write_in(snapshot, report, SubmittingStatus::Saved).await
    }

    async fn write_in(
        &self,
        snapshot: &mut S::Snapshot,
        mut report: LessonReport,
        status: SubmittingStatus,
    ) -> Result<LessonReport, ReportError> {
        report.submitting_status = Some(status);
        let is_draft = status.is_draft();

        self.resolve_identity(snapshot, &mut report, is_draft).await?;
        self.normalize(snapshot, &mut report).await?;
        self.is_valid(snapshot, &report, is_draft).await?;
        self.store(snapshot, &mut report, status).await?;
        Ok(report)
    }

    /// A known report id pins the lesson id to the stored one. Without an id
    /// an existing report for the lesson is adopted by a draft and rejected
    /// for a final submit.
    async fn resolve_identity(
        &self,
        snapshot: &mut S::Snapshot,
        report: &mut LessonReport,
        is_draft: bool,
    ) -> Result<(), ReportError> {
        if let Some(id) = &report.lesson_report_id {
            let current = self.storage.find_report(snapshot, id).await?;
            if current.lesson_id != report.lesson_id {
                debug!(
                    lesson_report_id = %id,
                    requested = %report.lesson_id,
                    stored = %current.lesson_id,
                    "keeping stored lesson id"
                );
            }
            report.lesson_id = current.lesson_id;
            return Ok(());
        }

        match self
            .storage
            .find_report_by_lesson(snapshot, &report.lesson_id)
            .await?
        {
            Some(current) if is_draft => {
                report.lesson_report_id = Some(current.lesson_report_id);
                report.lesson_id = current.lesson_id;
                Ok(())
            }
            Some(current) => Err(ReportError::Conflict {
                lesson_id: current.lesson_id,
            }),
            None => Ok(()),
        }
    }

    async fn store(
        &self,
        snapshot: &mut S::Snapshot,
        report: &mut LessonReport,
        status: SubmittingStatus,
    ) -> Result<(), ReportError> {
        let now = now_iso8601();
        let record = LessonReportRecord {
            lesson_report_id: report
                .lesson_report_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            lesson_id: report.lesson_id.clone(),
            submitting_status: status,
            form_config_id: report
                .form_config
                .as_ref()
                .map(|c| c.form_config_id.clone()),
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        let stored = if report.lesson_report_id.is_some() {
            self.storage.update_report(snapshot, record).await?
        } else {
            self.storage.create_report(snapshot, record).await?
        };
        let lesson_report_id = stored.lesson_report_id;
        report.lesson_report_id = Some(lesson_report_id.clone());

        // Field values are replaced as a whole: a field or student left out
        // of this write must not survive from an earlier one.
        let previous_detail_ids: Vec<String> = self
            .storage
            .details_by_report(snapshot, &lesson_report_id)
            .await?
            .into_iter()
            .map(|d| d.lesson_report_detail_id)
            .collect();
        if !previous_detail_ids.is_empty() {
            self.storage
                .delete_field_values_by_details(snapshot, &previous_detail_ids)
                .await?;
        }

        self.storage
            .upsert_details(
                snapshot,
                &lesson_report_id,
                report.details.to_detail_records(&lesson_report_id, &now),
            )
            .await?;

        // Field values reference the stored detail id, not the student.
        let stored_details = self
            .storage
            .details_by_report(snapshot, &lesson_report_id)
            .await?;
        let detail_ids: HashMap<&str, &str> = stored_details
            .iter()
            .map(|d| (d.student_id.as_str(), d.lesson_report_detail_id.as_str()))
            .collect();

        let mut values = Vec::new();
        for detail in &mut report.details.0 {
            let detail_id = detail_ids.get(detail.student_id.as_str()).ok_or_else(|| {
                ReportError::Storage(StorageError::Backend(format!(
                    "no stored detail for student {}",
                    detail.student_id
                )))
            })?;
            detail.report_detail_id = detail_id.to_string();
            values.extend(detail.fields.to_records(detail_id, &now));
        }
        let value_count = values.len();
        self.storage.upsert_field_values(snapshot, values).await?;

        let locked = report.lesson.as_ref().is_some_and(|l| l.is_locked);
        if locked {
            debug!(lesson_id = %report.lesson_id, "lesson locked, member attendance untouched");
        } else {
            self.storage
                .update_member_fields(
                    snapshot,
                    report.details.to_member_records(&report.lesson_id, &now),
                    &MemberField::ATTENDANCE,
                )
                .await?;
        }

        debug!(
            lesson_report_id = %lesson_report_id,
            details = report.details.len(),
            field_values = value_count,
            "lesson report stored"
        );
        Ok(())
    }

    /// Mark the lesson completed once a final submit has every student's
    /// attendance. Returns whether the lesson status was changed.
    ///
    /// Runs only when enabled in [`EngineConfig`] and a
    /// [`LessonStatusUpdater`] is set; canceled and already completed
    /// lessons are left alone. Callers of [`ReportEngine::submit_in`] invoke
    /// this after committing their snapshot.
    pub async fn complete_lesson_if_attended(
        &self,
        report: &mut LessonReport,
    ) -> Result<bool, ReportError> {
        if !self.config.complete_lesson_on_full_attendance {
            return Ok(false);
        }
        let Some(updater) = &self.lesson_status else {
            return Ok(false);
        };
        if report.submitting_status != Some(SubmittingStatus::Submitted)
            || !report.details.check_students_attendance()
        {
            return Ok(false);
        }
        let Some(lesson) = report.lesson.as_mut() else {
            return Ok(false);
        };
        if matches!(
            lesson.scheduling_status,
            LessonSchedulingStatus::Canceled | LessonSchedulingStatus::Completed
        ) {
            return Ok(false);
        }

        updater
            .update_scheduling_status(&lesson.lesson_id, LessonSchedulingStatus::Completed)
            .await
            .map_err(|e| ReportError::LessonStatus(e.to_string()))?;
        lesson.scheduling_status = LessonSchedulingStatus::Completed;
        info!(lesson_id = %lesson.lesson_id, "lesson marked completed");
        Ok(true)
    }

    // ── Delete ──────────────────────────────────────────────────────────

    pub async fn delete(&self, lesson_report_id: &str) -> Result<(), ReportError> {
        let mut snapshot = self.storage.begin_snapshot().await?;
        let result = self.delete_in(&mut snapshot, lesson_report_id).await;
        self.settle(snapshot, result).await?;
        info!(lesson_report_id, "lesson report deleted");
        Ok(())
    }

    /// Delete the report, its details and their field values, then clear
    /// attendance status and remark of the members the details covered.
    pub async fn delete_in(
        &self,
        snapshot: &mut S::Snapshot,
        lesson_report_id: &str,
    ) -> Result<(), ReportError> {
        let report = self
            .get_data_in(
                snapshot,
                lesson_report_id,
                GetDataOptions::default()
                    .ignore_form_config()
                    .ignore_field_values(),
            )
            .await?;

        self.storage
            .delete_report(snapshot, lesson_report_id)
            .await?;
        if report.details.is_empty() {
            return Ok(());
        }

        self.storage
            .delete_details_by_report(snapshot, lesson_report_id)
            .await?;
        self.storage
            .delete_field_values_by_details(snapshot, &report.details.report_detail_ids())
            .await?;

        let now = now_iso8601();
        let members = report
            .details
            .iter()
            .map(|d| LessonMemberRecord {
                updated_at: now.clone(),
                ..LessonMemberRecord::new(&report.lesson_id, &d.student_id)
            })
            .collect();
        self.storage
            .update_member_fields(snapshot, members, &MemberField::STATUS_AND_REMARK)
            .await?;
        Ok(())
    }

    // ── Load ────────────────────────────────────────────────────────────

    pub async fn get_data(
        &self,
        lesson_report_id: &str,
        options: GetDataOptions,
    ) -> Result<LessonReport, ReportError> {
        let mut snapshot = self.storage.begin_snapshot().await?;
        let result = self
            .get_data_in(&mut snapshot, lesson_report_id, options)
            .await;
        if let Err(e) = self.storage.abort_snapshot(snapshot).await {
            warn!(error = %e, "failed to release read snapshot");
        }
        result
    }

    /// Load a stored report. Details carry the attendance currently held by
    /// the lesson members.
    pub async fn get_data_in(
        &self,
        snapshot: &mut S::Snapshot,
        lesson_report_id: &str,
        options: GetDataOptions,
    ) -> Result<LessonReport, ReportError> {
        let record = self.storage.find_report(snapshot, lesson_report_id).await?;
        let mut report = LessonReport {
            lesson_report_id: Some(record.lesson_report_id),
            lesson_id: record.lesson_id,
            submitting_status: Some(record.submitting_status),
            ..LessonReport::default()
        };

        if options.form_config {
            let lesson = self.storage.find_lesson(snapshot, &report.lesson_id).await?;
            let form_config = self.resolve_form_config(snapshot, &lesson, None).await?;
            report.form_config = Some(form_config);
            report.lesson = Some(lesson);
        }

        if options.details {
            let details = self
                .storage
                .details_by_report(snapshot, lesson_report_id)
                .await?;
            let members = self
                .storage
                .members_of_lesson(snapshot, &report.lesson_id)
                .await?;
            report.details = LessonReportDetails::from_records(details, &members);

            if options.field_values {
                let values = self
                    .storage
                    .field_values_by_details(snapshot, &report.details.report_detail_ids())
                    .await?;
                report.details.add_field_values(fields_by_detail_id(values));
            }
        }

        Ok(report)
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    /// Teacher → first school → form config for the feature of the lesson's
    /// teaching method, unless `feature_name` overrides it.
    async fn resolve_form_config(
        &self,
        snapshot: &mut S::Snapshot,
        lesson: &LessonRecord,
        feature_name: Option<&str>,
    ) -> Result<FormConfig, ReportError> {
        let teacher = self.storage.find_teacher(snapshot, &lesson.teacher_id).await?;
        let partner_id = teacher
            .school_ids
            .first()
            .copied()
            .ok_or_else(|| ValidationError::TeacherWithoutSchool(teacher.teacher_id.clone()))?;
        let feature = feature_name
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| self.config.feature_name_for(lesson.teaching_method));

        let record = self
            .storage
            .find_by_partner_and_feature(snapshot, partner_id, feature)
            .await?;
        debug!(
            form_config_id = %record.form_config_id,
            partner_id,
            feature,
            "form config resolved"
        );
        Ok(FormConfig::from_stored(
            record.form_config_id,
            &record.form_config_data,
        )?)
    }

    /// Commit on success, abort on error.
    async fn settle<T>(
        &self,
        snapshot: <S as SnapshotStore>::Snapshot,
        result: Result<T, ReportError>,
    ) -> Result<T, ReportError> {
        match result {
            Ok(value) => {
                self.storage.commit_snapshot(snapshot).await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort) = self.storage.abort_snapshot(snapshot).await {
                    warn!(error = %abort, "failed to abort snapshot");
                }
                debug!(error = %e, "operation aborted");
                Err(e)
            }
        }
    }
}

/// Current UTC time as an RFC 3339 string with second precision.
fn now_iso8601() -> String {
    let now = time::OffsetDateTime::now_utc();
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}
