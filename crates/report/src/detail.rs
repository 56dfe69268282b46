//! Per-student report details and their dynamic fields.
//!
//! A detail carries the five system attendance attributes as first-class
//! values plus an ordered list of dynamic fields keyed by form config field
//! id. Both collections are plain ordered lists; `normalize` is what makes
//! their ids unique, keeping the first occurrence.

use std::collections::{HashMap, HashSet};

use lesson_report_core::{
    AttendanceNotice, AttendanceReason, AttendanceStatus, AttributeValue, FormConfigField,
    SystemDefinedField,
};
use lesson_report_storage::{FieldValueRecord, LessonMemberRecord, LessonReportDetailRecord};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ── Fields ──────────────────────────────────────────────────────────────────

/// One dynamic field value of a detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonReportField {
    pub field_id: String,
    pub value: AttributeValue,
    /// Value type as declared by the writer. Empty means the kind of
    /// `value`.
    #[serde(default)]
    pub value_type: String,
    /// Opaque rendering hints stored alongside the value.
    #[serde(default)]
    pub field_render_guide: Option<serde_json::Value>,
}

impl LessonReportField {
    pub fn new(field_id: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            field_id: field_id.into(),
            value_type: value.kind().as_str().to_string(),
            value,
            field_render_guide: None,
        }
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if self.field_id.is_empty() {
            return Err(ValidationError::EmptyFieldId);
        }
        Ok(())
    }

    fn to_record(&self, lesson_report_detail_id: &str, now: &str) -> FieldValueRecord {
        FieldValueRecord {
            dynamic_form_field_value_id: new_id(),
            lesson_report_detail_id: lesson_report_detail_id.to_string(),
            field_id: self.field_id.clone(),
            value: self.value.clone(),
            value_type: if self.value_type.is_empty() {
                self.value.kind().as_str().to_string()
            } else {
                self.value_type.clone()
            },
            field_render_guide: self.field_render_guide.clone(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    fn from_record(record: FieldValueRecord) -> Self {
        Self {
            field_id: record.field_id,
            value: record.value.dedup(),
            value_type: record.value_type,
            field_render_guide: record.field_render_guide,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonReportFields(pub Vec<LessonReportField>);

impl LessonReportFields {
    pub fn iter(&self) -> std::slice::Iter<'_, LessonReportField> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field_id: &str) -> Option<&LessonReportField> {
        self.0.iter().find(|f| f.field_id == field_id)
    }

    /// Every field has an id and no id repeats.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for field in &self.0 {
            field.is_valid()?;
            if !seen.insert(field.field_id.as_str()) {
                return Err(ValidationError::DuplicateFieldId(field.field_id.clone()));
            }
        }
        Ok(())
    }

    /// Drop later fields whose id already appeared.
    pub fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.0.retain(|f| seen.insert(f.field_id.clone()));
    }

    /// The first field for each of `ids`, in collection order.
    pub fn by_ids(&self, ids: &[&str]) -> Self {
        let mut wanted: HashSet<&str> = ids.iter().copied().collect();
        self.0
            .iter()
            .filter(|f| wanted.remove(f.field_id.as_str()))
            .cloned()
            .collect()
    }

    pub fn to_records(&self, lesson_report_detail_id: &str, now: &str) -> Vec<FieldValueRecord> {
        self.0
            .iter()
            .map(|f| f.to_record(lesson_report_detail_id, now))
            .collect()
    }
}

impl FromIterator<LessonReportField> for LessonReportFields {
    fn from_iter<I: IntoIterator<Item = LessonReportField>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<LessonReportField>> for LessonReportFields {
    fn from(fields: Vec<LessonReportField>) -> Self {
        Self(fields)
    }
}

// ── Details ─────────────────────────────────────────────────────────────────

/// One student's part of a lesson report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonReportDetail {
    /// Assigned by storage; empty until the detail is persisted.
    #[serde(default)]
    pub report_detail_id: String,
    pub student_id: String,
    #[serde(default)]
    pub attendance_status: AttendanceStatus,
    #[serde(default)]
    pub attendance_remark: String,
    #[serde(default)]
    pub attendance_notice: AttendanceNotice,
    #[serde(default)]
    pub attendance_reason: AttendanceReason,
    #[serde(default)]
    pub attendance_note: String,
    #[serde(default)]
    pub fields: LessonReportFields,
}

impl LessonReportDetail {
    pub fn new(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            ..Self::default()
        }
    }

    pub fn with_fields(mut self, fields: impl Into<LessonReportFields>) -> Self {
        self.fields = fields.into();
        self
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if self.student_id.is_empty() {
            return Err(ValidationError::EmptyStudentId);
        }
        self.fields.is_valid()
    }

    /// Whether the system attribute behind `field` holds a value.
    fn has_system_value(&self, field: SystemDefinedField) -> bool {
        match field {
            SystemDefinedField::AttendanceStatus => !self.attendance_status.is_empty(),
            SystemDefinedField::AttendanceRemark => !self.attendance_remark.is_empty(),
            SystemDefinedField::AttendanceNotice => !self.attendance_notice.is_empty(),
            SystemDefinedField::AttendanceReason => !self.attendance_reason.is_empty(),
            SystemDefinedField::AttendanceNote => !self.attendance_note.is_empty(),
        }
    }

    fn to_member_record(&self, lesson_id: &str, now: &str) -> LessonMemberRecord {
        LessonMemberRecord {
            lesson_id: lesson_id.to_string(),
            user_id: self.student_id.clone(),
            attendance_status: self.attendance_status,
            attendance_remark: self.attendance_remark.clone(),
            attendance_notice: self.attendance_notice,
            attendance_reason: self.attendance_reason,
            attendance_note: self.attendance_note.clone(),
            updated_at: now.to_string(),
        }
    }
}

/// The ordered details of a lesson report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonReportDetails(pub Vec<LessonReportDetail>);

impl LessonReportDetails {
    pub fn iter(&self) -> std::slice::Iter<'_, LessonReportDetail> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every detail is valid and no student id repeats.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for detail in &self.0 {
            detail.is_valid()?;
            if !seen.insert(detail.student_id.as_str()) {
                return Err(ValidationError::DuplicateStudentId(
                    detail.student_id.clone(),
                ));
            }
        }
        Ok(())
    }

    /// Keep the first detail per student and normalize each one's fields.
    /// Normalizing twice changes nothing.
    pub fn normalize(&mut self) {
        let student_ids: Vec<String> = self.0.iter().map(|d| d.student_id.clone()).collect();
        *self = self.by_student_ids(&student_ids);
        for detail in &mut self.0 {
            detail.fields.normalize();
        }
    }

    /// The first detail for each of `student_ids`, in collection order.
    pub fn by_student_ids(&self, student_ids: &[String]) -> Self {
        let mut wanted: HashSet<&str> = student_ids.iter().map(String::as_str).collect();
        self.0
            .iter()
            .filter(|d| wanted.remove(d.student_id.as_str()))
            .cloned()
            .collect()
    }

    pub fn only_have_learner_ids(&self, learner_ids: &[String]) -> Result<(), ValidationError> {
        let learners: HashSet<&str> = learner_ids.iter().map(String::as_str).collect();
        match self
            .0
            .iter()
            .find(|d| !learners.contains(d.student_id.as_str()))
        {
            Some(d) => Err(ValidationError::NotLessonLearner(d.student_id.clone())),
            None => Ok(()),
        }
    }

    /// Dynamic fields must be declared by the form config and must not reuse
    /// a system field id. A detail carrying an attendance status or remark
    /// needs that system field in the form config too.
    pub fn only_have_allow_fields(
        &self,
        allow_fields: &HashMap<&str, &FormConfigField>,
    ) -> Result<(), ValidationError> {
        for detail in &self.0 {
            for field in detail.fields.iter() {
                if !allow_fields.contains_key(field.field_id.as_str()) {
                    return Err(ValidationError::FieldNotInFormConfig {
                        field_id: field.field_id.clone(),
                        student_id: detail.student_id.clone(),
                    });
                }
                if SystemDefinedField::is_system_defined(&field.field_id) {
                    return Err(ValidationError::NotDynamicField {
                        field_id: field.field_id.clone(),
                        student_id: detail.student_id.clone(),
                    });
                }
            }

            for system in [
                SystemDefinedField::AttendanceStatus,
                SystemDefinedField::AttendanceRemark,
            ] {
                if detail.has_system_value(system) && !allow_fields.contains_key(system.as_str()) {
                    return Err(ValidationError::SystemFieldNotConfigured {
                        field_id: system.as_str().to_string(),
                        student_id: detail.student_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Check every required field of every detail. System fields are checked
    /// against the attendance attributes, dynamic ones against the detail's
    /// fields using [`AttributeValue::satisfies_required`].
    pub fn validate_required_fields_value(
        &self,
        required_fields: &HashMap<&str, &FormConfigField>,
    ) -> Result<(), ValidationError> {
        let mut required: Vec<(&str, &FormConfigField)> =
            required_fields.iter().map(|(id, f)| (*id, *f)).collect();
        required.sort_by_key(|(id, _)| *id);

        for detail in &self.0 {
            for (field_id, declared) in &required {
                let satisfied = match SystemDefinedField::from_field_id(field_id) {
                    Some(system) => detail.has_system_value(system),
                    None => detail.fields.get(field_id).is_some_and(|field| {
                        // An undeclared kind cannot be checked for emptiness.
                        declared
                            .value_kind()
                            .map_or(true, |kind| field.value.satisfies_required(kind))
                    }),
                };
                if !satisfied {
                    return Err(ValidationError::RequiredField {
                        field_id: field_id.to_string(),
                        student_id: detail.student_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether every student has an attendance status.
    pub fn check_students_attendance(&self) -> bool {
        self.0.iter().all(|d| !d.attendance_status.is_empty())
    }

    pub fn report_detail_ids(&self) -> Vec<String> {
        self.0.iter().map(|d| d.report_detail_id.clone()).collect()
    }

    /// Replace the fields of every detail whose id is a key of `fields`.
    pub fn add_field_values(&mut self, mut fields: HashMap<String, LessonReportFields>) {
        for detail in &mut self.0 {
            if let Some(v) = fields.remove(&detail.report_detail_id) {
                detail.fields = v;
            }
        }
    }

    /// Detail rows for `lesson_report_id` with fresh ids. Storage keeps the
    /// stored id of a student that already has a row.
    pub fn to_detail_records(
        &self,
        lesson_report_id: &str,
        now: &str,
    ) -> Vec<LessonReportDetailRecord> {
        self.0
            .iter()
            .map(|d| LessonReportDetailRecord {
                lesson_report_detail_id: new_id(),
                lesson_report_id: lesson_report_id.to_string(),
                student_id: d.student_id.clone(),
                created_at: now.to_string(),
                updated_at: now.to_string(),
            })
            .collect()
    }

    pub fn to_member_records(&self, lesson_id: &str, now: &str) -> Vec<LessonMemberRecord> {
        self.0
            .iter()
            .map(|d| d.to_member_record(lesson_id, now))
            .collect()
    }

    /// Rebuild details from stored rows, taking attendance from the matching
    /// lesson member.
    pub fn from_records(
        details: Vec<LessonReportDetailRecord>,
        members: &[LessonMemberRecord],
    ) -> Self {
        let members_by_id: HashMap<&str, &LessonMemberRecord> =
            members.iter().map(|m| (m.user_id.as_str(), m)).collect();

        details
            .into_iter()
            .map(|record| {
                let mut detail = LessonReportDetail {
                    report_detail_id: record.lesson_report_detail_id,
                    ..LessonReportDetail::new(record.student_id)
                };
                if let Some(member) = members_by_id.get(detail.student_id.as_str()) {
                    detail.attendance_status = member.attendance_status;
                    detail.attendance_remark = member.attendance_remark.clone();
                    detail.attendance_notice = member.attendance_notice;
                    detail.attendance_reason = member.attendance_reason;
                    detail.attendance_note = member.attendance_note.clone();
                }
                detail
            })
            .collect()
    }
}

impl FromIterator<LessonReportDetail> for LessonReportDetails {
    fn from_iter<I: IntoIterator<Item = LessonReportDetail>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<LessonReportDetail>> for LessonReportDetails {
    fn from(details: Vec<LessonReportDetail>) -> Self {
        Self(details)
    }
}

/// Group stored field values by their detail id.
pub fn fields_by_detail_id(values: Vec<FieldValueRecord>) -> HashMap<String, LessonReportFields> {
    let mut grouped: HashMap<String, LessonReportFields> = HashMap::new();
    for record in values {
        grouped
            .entry(record.lesson_report_detail_id.clone())
            .or_default()
            .0
            .push(LessonReportField::from_record(record));
    }
    grouped
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_report_core::ValueKind;

    fn detail(student_id: &str) -> LessonReportDetail {
        LessonReportDetail::new(student_id)
    }

    fn ids(details: &LessonReportDetails) -> Vec<&str> {
        details.iter().map(|d| d.student_id.as_str()).collect()
    }

    fn learners(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    // ── Normalization ──

    #[test]
    fn normalize_keeps_first_detail_per_student() {
        let mut details: LessonReportDetails = vec![
            detail("s1"),
            detail("s2").with_fields(vec![LessonReportField::new("title", AttributeValue::string("first"))]),
            detail("s2").with_fields(vec![LessonReportField::new("title", AttributeValue::string("second"))]),
        ]
        .into();
        details.normalize();

        assert_eq!(ids(&details), ["s1", "s2"]);
        assert_eq!(
            details.0[1].fields.get("title").map(|f| &f.value),
            Some(&AttributeValue::string("first"))
        );
    }

    #[test]
    fn normalize_is_a_fixed_point() {
        let mut details: LessonReportDetails = vec![
            detail("s1").with_fields(vec![
                LessonReportField::new("a", AttributeValue::int(1)),
                LessonReportField::new("a", AttributeValue::int(2)),
                LessonReportField::new("b", AttributeValue::bool(true)),
            ]),
            detail("s2"),
            detail("s1"),
        ]
        .into();
        details.normalize();
        let once = details.clone();
        details.normalize();

        assert_eq!(details, once);
        assert_eq!(details.0[0].fields.len(), 2);
    }

    #[test]
    fn by_student_ids_keeps_collection_order() {
        let details: LessonReportDetails =
            vec![detail("s1"), detail("s2"), detail("s3"), detail("s2")].into();
        let picked = details.by_student_ids(&learners(&["s3", "s2"]));
        assert_eq!(ids(&picked), ["s2", "s3"]);
    }

    #[test]
    fn fields_by_ids_picks_first_match() {
        let fields: LessonReportFields = vec![
            LessonReportField::new("a", AttributeValue::int(1)),
            LessonReportField::new("b", AttributeValue::int(2)),
            LessonReportField::new("a", AttributeValue::int(3)),
        ]
        .into();
        let picked = fields.by_ids(&["a"]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked.0[0].value, AttributeValue::int(1));
    }

    // ── Structural validity ──

    #[test]
    fn duplicate_student_is_invalid() {
        let details: LessonReportDetails = vec![detail("s1"), detail("s1")].into();
        assert_eq!(
            details.is_valid(),
            Err(ValidationError::DuplicateStudentId("s1".into()))
        );
    }

    #[test]
    fn empty_student_and_field_ids_are_invalid() {
        let details: LessonReportDetails = vec![detail("")].into();
        assert_eq!(details.is_valid(), Err(ValidationError::EmptyStudentId));

        let details: LessonReportDetails =
            vec![detail("s1").with_fields(vec![LessonReportField::new("", AttributeValue::int(1))])]
                .into();
        assert_eq!(details.is_valid(), Err(ValidationError::EmptyFieldId));
    }

    #[test]
    fn duplicate_field_is_invalid() {
        let details: LessonReportDetails = vec![detail("s1").with_fields(vec![
            LessonReportField::new("a", AttributeValue::int(1)),
            LessonReportField::new("a", AttributeValue::int(2)),
        ])]
        .into();
        assert_eq!(
            details.is_valid(),
            Err(ValidationError::DuplicateFieldId("a".into()))
        );
    }

    // ── Membership ──

    #[test]
    fn student_outside_lesson_is_rejected() {
        let details: LessonReportDetails = vec![detail("s1"), detail("s5")].into();
        assert_eq!(
            details.only_have_learner_ids(&learners(&["s1", "s2", "s3"])),
            Err(ValidationError::NotLessonLearner("s5".into()))
        );
        assert!(details
            .only_have_learner_ids(&learners(&["s1", "s5"]))
            .is_ok());
    }

    // ── Allowed fields ──

    fn config_fields() -> Vec<FormConfigField> {
        vec![
            FormConfigField::new("attendance_status", ValueKind::String, true),
            FormConfigField::new("ordinal-number", ValueKind::Int, true),
            FormConfigField::new("title", ValueKind::String, false),
            FormConfigField::new("tags", ValueKind::StringSet, true),
        ]
    }

    fn by_id(fields: &[FormConfigField]) -> HashMap<&str, &FormConfigField> {
        fields.iter().map(|f| (f.field_id.as_str(), f)).collect()
    }

    #[test]
    fn unknown_dynamic_field_is_rejected() {
        let fields = config_fields();
        let details: LessonReportDetails = vec![detail("s1")
            .with_fields(vec![LessonReportField::new("comment", AttributeValue::string("x"))])]
        .into();
        assert_eq!(
            details.only_have_allow_fields(&by_id(&fields)),
            Err(ValidationError::FieldNotInFormConfig {
                field_id: "comment".into(),
                student_id: "s1".into(),
            })
        );
    }

    #[test]
    fn system_field_id_cannot_be_dynamic() {
        let fields = config_fields();
        let details: LessonReportDetails = vec![detail("s1").with_fields(vec![
            LessonReportField::new("attendance_status", AttributeValue::string("ATTEND")),
        ])]
        .into();
        assert_eq!(
            details.only_have_allow_fields(&by_id(&fields)),
            Err(ValidationError::NotDynamicField {
                field_id: "attendance_status".into(),
                student_id: "s1".into(),
            })
        );
    }

    #[test]
    fn attendance_remark_needs_configured_system_field() {
        let fields = config_fields();
        let mut d = detail("s1");
        d.attendance_status = AttendanceStatus::Attend;
        d.attendance_remark = "late bus".into();
        let details: LessonReportDetails = vec![d].into();
        assert_eq!(
            details.only_have_allow_fields(&by_id(&fields)),
            Err(ValidationError::SystemFieldNotConfigured {
                field_id: "attendance_remark".into(),
                student_id: "s1".into(),
            })
        );
    }

    #[test]
    fn empty_allow_list_accepts_bare_details() {
        let details: LessonReportDetails = vec![detail("s1"), detail("s2")].into();
        assert!(details.only_have_allow_fields(&HashMap::new()).is_ok());
    }

    // ── Required fields ──

    fn required_of(fields: &[FormConfigField]) -> HashMap<&str, &FormConfigField> {
        fields
            .iter()
            .filter(|f| f.is_required)
            .map(|f| (f.field_id.as_str(), f))
            .collect()
    }

    fn complete_detail(student_id: &str) -> LessonReportDetail {
        let mut d = detail(student_id).with_fields(vec![
            LessonReportField::new("ordinal-number", AttributeValue::int(3)),
            LessonReportField::new("tags", AttributeValue::string_set(["a"])),
        ]);
        d.attendance_status = AttendanceStatus::Late;
        d
    }

    #[test]
    fn complete_details_satisfy_required_fields() {
        let fields = config_fields();
        let details: LessonReportDetails =
            vec![complete_detail("s1"), complete_detail("s2")].into();
        assert!(details
            .validate_required_fields_value(&required_of(&fields))
            .is_ok());
    }

    #[test]
    fn missing_attendance_status_fails_required() {
        let fields = config_fields();
        let mut d = complete_detail("s1");
        d.attendance_status = AttendanceStatus::Empty;
        let details: LessonReportDetails = vec![d].into();
        assert_eq!(
            details.validate_required_fields_value(&required_of(&fields)),
            Err(ValidationError::RequiredField {
                field_id: "attendance_status".into(),
                student_id: "s1".into(),
            })
        );
    }

    #[test]
    fn empty_set_fails_required() {
        let fields = config_fields();
        let mut d = complete_detail("s1");
        d.fields.0[1].value = AttributeValue::string_set(Vec::<String>::new());
        let details: LessonReportDetails = vec![d].into();
        assert_eq!(
            details.validate_required_fields_value(&required_of(&fields)),
            Err(ValidationError::RequiredField {
                field_id: "tags".into(),
                student_id: "s1".into(),
            })
        );
    }

    #[test]
    fn absent_int_field_fails_required() {
        let fields = config_fields();
        let mut d = complete_detail("s1");
        d.fields.0.remove(0);
        let details: LessonReportDetails = vec![d].into();
        assert_eq!(
            details.validate_required_fields_value(&required_of(&fields)),
            Err(ValidationError::RequiredField {
                field_id: "ordinal-number".into(),
                student_id: "s1".into(),
            })
        );
    }

    #[test]
    fn zero_int_satisfies_required_once_present() {
        // Known quirk: Int and Bool required fields only need the entry.
        let fields = config_fields();
        let mut d = complete_detail("s1");
        d.fields.0[0].value = AttributeValue::int(0);
        let details: LessonReportDetails = vec![d].into();
        assert!(details
            .validate_required_fields_value(&required_of(&fields))
            .is_ok());
    }

    // ── Attendance and conversions ──

    #[test]
    fn check_students_attendance_needs_every_status() {
        let mut a = detail("s1");
        a.attendance_status = AttendanceStatus::Attend;
        let b = detail("s2");
        let partial: LessonReportDetails = vec![a.clone(), b].into();
        assert!(!partial.check_students_attendance());

        let mut c = detail("s3");
        c.attendance_status = AttendanceStatus::Absent;
        let full: LessonReportDetails = vec![a, c].into();
        assert!(full.check_students_attendance());
    }

    #[test]
    fn from_records_joins_member_attendance() {
        let rows = vec![
            LessonReportDetailRecord {
                lesson_report_detail_id: "d1".into(),
                lesson_report_id: "r1".into(),
                student_id: "s1".into(),
                created_at: String::new(),
                updated_at: String::new(),
            },
            LessonReportDetailRecord {
                lesson_report_detail_id: "d2".into(),
                lesson_report_id: "r1".into(),
                student_id: "s9".into(),
                created_at: String::new(),
                updated_at: String::new(),
            },
        ];
        let mut member = LessonMemberRecord::new("l1", "s1");
        member.attendance_status = AttendanceStatus::InformedLate;
        member.attendance_remark = "train".into();

        let details = LessonReportDetails::from_records(rows, &[member]);
        assert_eq!(details.report_detail_ids(), ["d1", "d2"]);
        assert_eq!(details.0[0].attendance_status, AttendanceStatus::InformedLate);
        assert_eq!(details.0[0].attendance_remark, "train");
        assert!(details.0[1].attendance_status.is_empty());
    }

    #[test]
    fn field_records_carry_declared_or_derived_value_type() {
        let declared = LessonReportField::new("ordinal-number", AttributeValue::int(3));
        let undeclared = LessonReportField {
            value_type: String::new(),
            ..LessonReportField::new("tags", AttributeValue::string_set(["a"]))
        };
        let fields: LessonReportFields = vec![declared, undeclared].into();

        let records = fields.to_records("d1", "2025-01-01T00:00:00Z");
        assert_eq!(records[0].value_type, "VALUE_TYPE_INT");
        assert_eq!(records[1].value_type, "VALUE_TYPE_STRING_SET");
    }

    #[test]
    fn add_field_values_attaches_by_detail_id() {
        let mut details = LessonReportDetails::from_records(
            vec![LessonReportDetailRecord {
                lesson_report_detail_id: "d1".into(),
                lesson_report_id: "r1".into(),
                student_id: "s1".into(),
                created_at: String::new(),
                updated_at: String::new(),
            }],
            &[],
        );
        let values = vec![FieldValueRecord {
            dynamic_form_field_value_id: "v1".into(),
            lesson_report_detail_id: "d1".into(),
            field_id: "tags".into(),
            value: AttributeValue::IntSet(vec![1, 1, 2]),
            value_type: "VALUE_TYPE_INT_SET".into(),
            field_render_guide: None,
            created_at: String::new(),
            updated_at: String::new(),
        }];
        details.add_field_values(fields_by_detail_id(values));

        assert_eq!(
            details.0[0].fields.get("tags").map(|f| &f.value),
            Some(&AttributeValue::IntSet(vec![1, 2]))
        );
    }

    #[test]
    fn member_records_carry_all_attendance_attributes() {
        let mut d = detail("s1");
        d.attendance_status = AttendanceStatus::Absent;
        d.attendance_notice = AttendanceNotice::OnTheDay;
        d.attendance_reason = AttendanceReason::FamilyReason;
        d.attendance_note = "called".into();
        let details: LessonReportDetails = vec![d].into();

        let members = details.to_member_records("l1", "2025-01-01T00:00:00Z");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].lesson_id, "l1");
        assert_eq!(members[0].attendance_reason, AttendanceReason::FamilyReason);
        assert_eq!(members[0].attendance_note, "called");
        assert_eq!(members[0].updated_at, "2025-01-01T00:00:00Z");
    }
}
