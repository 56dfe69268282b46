//! Wire shape of a write (submit or save-draft) request and its conversion
//! into a [`LessonReport`].

use lesson_report_core::{AttendanceNotice, AttendanceReason, AttendanceStatus, AttributeValue};
use serde::{Deserialize, Serialize};

use crate::detail::{LessonReportDetail, LessonReportField, LessonReportFields};
use crate::error::ValidationError;
use crate::report::LessonReport;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteLessonReportRequest {
    /// Empty when creating.
    pub lesson_report_id: String,
    pub lesson_id: String,
    pub feature_name: String,
    pub details: Vec<WriteLessonReportDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteLessonReportDetail {
    pub student_id: String,
    pub attendance_status: AttendanceStatus,
    pub attendance_remark: String,
    pub attendance_notice: AttendanceNotice,
    pub attendance_reason: AttendanceReason,
    pub attendance_note: String,
    pub field_values: Vec<DynamicFieldValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicFieldValue {
    pub dynamic_field_id: String,
    pub value: Option<DynamicValue>,
    /// Kind declared by the client, stored with the value. The form config
    /// stays authoritative for validation.
    pub value_type: String,
    pub field_render_guide: Option<serde_json::Value>,
}

/// The value of a dynamic field, exactly one kind per message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicValue {
    IntValue(i32),
    StringValue(String),
    BoolValue(bool),
    IntArrayValue(Vec<i32>),
    StringArrayValue(Vec<String>),
    IntSetValue(Vec<i32>),
    StringSetValue(Vec<String>),
}

impl From<DynamicValue> for AttributeValue {
    fn from(value: DynamicValue) -> Self {
        match value {
            DynamicValue::IntValue(v) => AttributeValue::int(v),
            DynamicValue::StringValue(v) => AttributeValue::string(v),
            DynamicValue::BoolValue(v) => AttributeValue::bool(v),
            DynamicValue::IntArrayValue(v) => AttributeValue::int_array(v),
            DynamicValue::StringArrayValue(v) => AttributeValue::string_array(v),
            DynamicValue::IntSetValue(v) => AttributeValue::int_set(v),
            DynamicValue::StringSetValue(v) => AttributeValue::string_set(v),
        }
    }
}

impl LessonReport {
    /// Build a report from a write request. Empty ids and feature names are
    /// treated as absent; a field value without a value is rejected.
    pub fn from_write_request(req: WriteLessonReportRequest) -> Result<Self, ValidationError> {
        let details = req
            .details
            .into_iter()
            .map(detail_from_request)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LessonReport {
            lesson_report_id: non_empty(req.lesson_report_id),
            lesson_id: req.lesson_id,
            feature_name: non_empty(req.feature_name),
            ..LessonReport::default()
        }
        .with_details(details))
    }
}

fn detail_from_request(
    detail: WriteLessonReportDetail,
) -> Result<LessonReportDetail, ValidationError> {
    let fields = detail
        .field_values
        .into_iter()
        .map(|field| {
            let value = field
                .value
                .ok_or_else(|| ValidationError::MissingFieldValue {
                    field_id: field.dynamic_field_id.clone(),
                    student_id: detail.student_id.clone(),
                })?;
            Ok(LessonReportField {
                field_id: field.dynamic_field_id,
                value: value.into(),
                value_type: field.value_type,
                field_render_guide: field.field_render_guide,
            })
        })
        .collect::<Result<LessonReportFields, ValidationError>>()?;

    Ok(LessonReportDetail {
        report_detail_id: String::new(),
        student_id: detail.student_id,
        attendance_status: detail.attendance_status,
        attendance_remark: detail.attendance_remark,
        attendance_notice: detail.attendance_notice,
        attendance_reason: detail.attendance_reason,
        attendance_note: detail.attendance_note,
        fields,
    })
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_json_converts_into_report() {
        let req: WriteLessonReportRequest = serde_json::from_value(serde_json::json!({
            "lesson_id": "lesson-1",
            "details": [{
                "student_id": "student-1",
                "attendance_status": "STUDENT_ATTEND_STATUS_ATTEND",
                "attendance_notice": "IN_ADVANCE",
                "field_values": [
                    { "dynamic_field_id": "ordinal-number", "value": { "int_value": 5 }, "value_type": "VALUE_TYPE_INT" },
                    { "dynamic_field_id": "tags", "value": { "string_set_value": ["a", "b", "a"] } }
                ]
            }]
        }))
        .unwrap();

        let report = LessonReport::from_write_request(req).unwrap();
        assert_eq!(report.lesson_report_id, None);
        assert_eq!(report.feature_name, None);
        assert_eq!(report.lesson_id, "lesson-1");

        let detail = &report.details.0[0];
        assert_eq!(detail.attendance_status, AttendanceStatus::Attend);
        assert_eq!(detail.attendance_notice, AttendanceNotice::InAdvance);
        assert_eq!(
            detail.fields.get("ordinal-number").map(|f| &f.value),
            Some(&AttributeValue::Int(5))
        );
        assert_eq!(
            detail
                .fields
                .get("ordinal-number")
                .map(|f| f.value_type.as_str()),
            Some("VALUE_TYPE_INT")
        );
        assert_eq!(
            detail.fields.get("tags").map(|f| &f.value),
            Some(&AttributeValue::StringSet(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn ids_are_kept_when_present() {
        let req = WriteLessonReportRequest {
            lesson_report_id: "report-1".into(),
            lesson_id: "lesson-1".into(),
            feature_name: "FEATURE_NAME_GROUP_LESSON_REPORT".into(),
            details: Vec::new(),
        };
        let report = LessonReport::from_write_request(req).unwrap();
        assert_eq!(report.lesson_report_id.as_deref(), Some("report-1"));
        assert_eq!(
            report.feature_name.as_deref(),
            Some("FEATURE_NAME_GROUP_LESSON_REPORT")
        );
    }

    #[test]
    fn field_without_value_is_rejected() {
        let req = WriteLessonReportRequest {
            lesson_id: "lesson-1".into(),
            details: vec![WriteLessonReportDetail {
                student_id: "student-1".into(),
                field_values: vec![DynamicFieldValue {
                    dynamic_field_id: "title".into(),
                    ..DynamicFieldValue::default()
                }],
                ..WriteLessonReportDetail::default()
            }],
            ..WriteLessonReportRequest::default()
        };
        assert_eq!(
            LessonReport::from_write_request(req),
            Err(ValidationError::MissingFieldValue {
                field_id: "title".into(),
                student_id: "student-1".into(),
            })
        );
    }
}
