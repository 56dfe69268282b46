//! In-memory reference backend.
//!
//! Snapshots are serialized: `begin_snapshot` takes an owned async lock on
//! the tables and works on a private copy. Commit writes the copy back;
//! abort or drop discards it. Only one snapshot is open at a time, which
//! trivially gives the unique-report-per-lesson guarantee under
//! concurrency.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::conformance::Fixture;
use crate::error::StorageError;
use crate::record::{
    FieldValueRecord, LessonMemberRecord, LessonRecord, LessonReportDetailRecord,
    LessonReportRecord, MemberField, PartnerFormConfigRecord, TeacherRecord,
};
use crate::traits::{
    FormConfigStore, LessonMemberStore, LessonStore, ReportDetailStore, ReportStore,
    SnapshotStore, TeacherStore,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    lessons: Vec<LessonRecord>,
    teachers: Vec<TeacherRecord>,
    form_configs: Vec<PartnerFormConfigRecord>,
    reports: Vec<LessonReportRecord>,
    details: Vec<LessonReportDetailRecord>,
    field_values: Vec<FieldValueRecord>,
    members: Vec<LessonMemberRecord>,
}

/// Shared, cloneable in-memory storage. Clones see the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<Mutex<Tables>>,
}

/// An open transaction on [`InMemoryStorage`].
pub struct MemorySnapshot {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage pre-loaded with every record of `fixture`.
    pub fn seeded(fixture: &Fixture) -> Self {
        let tables = Tables {
            lessons: fixture.lessons.clone(),
            teachers: fixture.teachers.clone(),
            form_configs: fixture.form_configs.clone(),
            members: fixture.members.clone(),
            ..Tables::default()
        };
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    // ── Seeding (outside any snapshot) ───────────────────────────────────

    pub async fn insert_lesson(&self, lesson: LessonRecord) {
        self.tables.lock().await.lessons.push(lesson);
    }

    pub async fn insert_teacher(&self, teacher: TeacherRecord) {
        self.tables.lock().await.teachers.push(teacher);
    }

    pub async fn insert_form_config(&self, config: PartnerFormConfigRecord) {
        self.tables.lock().await.form_configs.push(config);
    }

    pub async fn insert_member(&self, member: LessonMemberRecord) {
        self.tables.lock().await.members.push(member);
    }

    // ── Inspection of committed state ────────────────────────────────────

    pub async fn reports(&self) -> Vec<LessonReportRecord> {
        self.tables.lock().await.reports.clone()
    }

    pub async fn details(&self) -> Vec<LessonReportDetailRecord> {
        self.tables.lock().await.details.clone()
    }

    pub async fn field_values(&self) -> Vec<FieldValueRecord> {
        self.tables.lock().await.field_values.clone()
    }

    pub async fn members(&self, lesson_id: &str) -> Vec<LessonMemberRecord> {
        self.tables
            .lock()
            .await
            .members
            .iter()
            .filter(|m| m.lesson_id == lesson_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStorage {
    type Snapshot = MemorySnapshot;

    async fn begin_snapshot(&self) -> Result<MemorySnapshot, StorageError> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        tracing::trace!("in-memory snapshot opened");
        Ok(MemorySnapshot { guard, working })
    }

    async fn commit_snapshot(&self, snapshot: MemorySnapshot) -> Result<(), StorageError> {
        let MemorySnapshot { mut guard, working } = snapshot;
        *guard = working;
        tracing::trace!("in-memory snapshot committed");
        Ok(())
    }

    async fn abort_snapshot(&self, snapshot: MemorySnapshot) -> Result<(), StorageError> {
        drop(snapshot);
        tracing::trace!("in-memory snapshot aborted");
        Ok(())
    }
}

#[async_trait]
impl FormConfigStore for InMemoryStorage {
    async fn find_by_partner_and_feature(
        &self,
        snapshot: &mut MemorySnapshot,
        partner_id: i32,
        feature_name: &str,
    ) -> Result<PartnerFormConfigRecord, StorageError> {
        snapshot
            .working
            .form_configs
            .iter()
            .find(|c| c.partner_id == partner_id && c.feature_name == feature_name)
            .cloned()
            .ok_or_else(|| StorageError::FormConfigNotFound {
                partner_id,
                feature_name: feature_name.to_string(),
            })
    }
}

#[async_trait]
impl LessonStore for InMemoryStorage {
    async fn find_lesson(
        &self,
        snapshot: &mut MemorySnapshot,
        lesson_id: &str,
    ) -> Result<LessonRecord, StorageError> {
        snapshot
            .working
            .lessons
            .iter()
            .find(|l| l.lesson_id == lesson_id)
            .cloned()
            .ok_or_else(|| StorageError::LessonNotFound {
                lesson_id: lesson_id.to_string(),
            })
    }

    async fn learner_ids_of_lesson(
        &self,
        snapshot: &mut MemorySnapshot,
        lesson_id: &str,
    ) -> Result<Vec<String>, StorageError> {
        Ok(snapshot
            .working
            .members
            .iter()
            .filter(|m| m.lesson_id == lesson_id)
            .map(|m| m.user_id.clone())
            .collect())
    }
}

#[async_trait]
impl TeacherStore for InMemoryStorage {
    async fn find_teacher(
        &self,
        snapshot: &mut MemorySnapshot,
        teacher_id: &str,
    ) -> Result<TeacherRecord, StorageError> {
        snapshot
            .working
            .teachers
            .iter()
            .find(|t| t.teacher_id == teacher_id)
            .cloned()
            .ok_or_else(|| StorageError::TeacherNotFound {
                teacher_id: teacher_id.to_string(),
            })
    }
}

#[async_trait]
impl ReportStore for InMemoryStorage {
    async fn create_report(
        &self,
        snapshot: &mut MemorySnapshot,
        record: LessonReportRecord,
    ) -> Result<LessonReportRecord, StorageError> {
        let reports = &mut snapshot.working.reports;
        if reports.iter().any(|r| r.lesson_id == record.lesson_id) {
            return Err(StorageError::ReportAlreadyExists {
                lesson_id: record.lesson_id,
            });
        }
        if reports
            .iter()
            .any(|r| r.lesson_report_id == record.lesson_report_id)
        {
            return Err(StorageError::Backend(format!(
                "duplicate lesson_report_id {}",
                record.lesson_report_id
            )));
        }
        reports.push(record.clone());
        Ok(record)
    }

    async fn update_report(
        &self,
        snapshot: &mut MemorySnapshot,
        record: LessonReportRecord,
    ) -> Result<LessonReportRecord, StorageError> {
        let existing = snapshot
            .working
            .reports
            .iter_mut()
            .find(|r| r.lesson_report_id == record.lesson_report_id)
            .ok_or_else(|| StorageError::ReportNotFound {
                lesson_report_id: record.lesson_report_id.clone(),
            })?;
        existing.submitting_status = record.submitting_status;
        existing.form_config_id = record.form_config_id;
        existing.updated_at = record.updated_at;
        Ok(existing.clone())
    }

    async fn find_report(
        &self,
        snapshot: &mut MemorySnapshot,
        lesson_report_id: &str,
    ) -> Result<LessonReportRecord, StorageError> {
        snapshot
            .working
            .reports
            .iter()
            .find(|r| r.lesson_report_id == lesson_report_id)
            .cloned()
            .ok_or_else(|| StorageError::ReportNotFound {
                lesson_report_id: lesson_report_id.to_string(),
            })
    }

    async fn find_report_by_lesson(
        &self,
        snapshot: &mut MemorySnapshot,
        lesson_id: &str,
    ) -> Result<Option<LessonReportRecord>, StorageError> {
        Ok(snapshot
            .working
            .reports
            .iter()
            .find(|r| r.lesson_id == lesson_id)
            .cloned())
    }

    async fn delete_report(
        &self,
        snapshot: &mut MemorySnapshot,
        lesson_report_id: &str,
    ) -> Result<(), StorageError> {
        let reports = &mut snapshot.working.reports;
        let before = reports.len();
        reports.retain(|r| r.lesson_report_id != lesson_report_id);
        if reports.len() == before {
            return Err(StorageError::ReportNotFound {
                lesson_report_id: lesson_report_id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ReportDetailStore for InMemoryStorage {
    async fn upsert_details(
        &self,
        snapshot: &mut MemorySnapshot,
        lesson_report_id: &str,
        details: Vec<LessonReportDetailRecord>,
    ) -> Result<(), StorageError> {
        let stored = &mut snapshot.working.details;
        let mut upserted = Vec::with_capacity(details.len());
        for mut detail in details {
            if let Some(existing) = stored.iter().find(|d| {
                d.lesson_report_id == lesson_report_id && d.student_id == detail.student_id
            }) {
                detail.lesson_report_detail_id = existing.lesson_report_detail_id.clone();
                detail.created_at = existing.created_at.clone();
            }
            detail.lesson_report_id = lesson_report_id.to_string();
            upserted.push(detail);
        }
        let dropped: Vec<String> = stored
            .iter()
            .filter(|d| {
                d.lesson_report_id == lesson_report_id
                    && !upserted.iter().any(|u| u.student_id == d.student_id)
            })
            .map(|d| d.lesson_report_detail_id.clone())
            .collect();
        stored.retain(|d| d.lesson_report_id != lesson_report_id);
        stored.extend(upserted);
        snapshot
            .working
            .field_values
            .retain(|v| !dropped.contains(&v.lesson_report_detail_id));
        Ok(())
    }

    async fn details_by_report(
        &self,
        snapshot: &mut MemorySnapshot,
        lesson_report_id: &str,
    ) -> Result<Vec<LessonReportDetailRecord>, StorageError> {
        Ok(snapshot
            .working
            .details
            .iter()
            .filter(|d| d.lesson_report_id == lesson_report_id)
            .cloned()
            .collect())
    }

    async fn upsert_field_values(
        &self,
        snapshot: &mut MemorySnapshot,
        values: Vec<FieldValueRecord>,
    ) -> Result<(), StorageError> {
        let stored = &mut snapshot.working.field_values;
        for mut value in values {
            match stored.iter_mut().find(|v| {
                v.lesson_report_detail_id == value.lesson_report_detail_id
                    && v.field_id == value.field_id
            }) {
                Some(existing) => {
                    value.dynamic_form_field_value_id =
                        existing.dynamic_form_field_value_id.clone();
                    value.created_at = existing.created_at.clone();
                    *existing = value;
                }
                None => stored.push(value),
            }
        }
        Ok(())
    }

    async fn field_values_by_details(
        &self,
        snapshot: &mut MemorySnapshot,
        detail_ids: &[String],
    ) -> Result<Vec<FieldValueRecord>, StorageError> {
        Ok(snapshot
            .working
            .field_values
            .iter()
            .filter(|v| detail_ids.contains(&v.lesson_report_detail_id))
            .cloned()
            .collect())
    }

    async fn delete_details_by_report(
        &self,
        snapshot: &mut MemorySnapshot,
        lesson_report_id: &str,
    ) -> Result<(), StorageError> {
        snapshot
            .working
            .details
            .retain(|d| d.lesson_report_id != lesson_report_id);
        Ok(())
    }

    async fn delete_field_values_by_details(
        &self,
        snapshot: &mut MemorySnapshot,
        detail_ids: &[String],
    ) -> Result<(), StorageError> {
        snapshot
            .working
            .field_values
            .retain(|v| !detail_ids.contains(&v.lesson_report_detail_id));
        Ok(())
    }
}

#[async_trait]
impl LessonMemberStore for InMemoryStorage {
    async fn members_of_lesson(
        &self,
        snapshot: &mut MemorySnapshot,
        lesson_id: &str,
    ) -> Result<Vec<LessonMemberRecord>, StorageError> {
        Ok(snapshot
            .working
            .members
            .iter()
            .filter(|m| m.lesson_id == lesson_id)
            .cloned()
            .collect())
    }

    async fn update_member_fields(
        &self,
        snapshot: &mut MemorySnapshot,
        members: Vec<LessonMemberRecord>,
        fields: &[MemberField],
    ) -> Result<(), StorageError> {
        for source in &members {
            let Some(target) = snapshot
                .working
                .members
                .iter_mut()
                .find(|m| m.lesson_id == source.lesson_id && m.user_id == source.user_id)
            else {
                continue;
            };
            for field in fields {
                field.apply(target, source);
            }
            target.updated_at = source.updated_at.clone();
        }
        Ok(())
    }
}
