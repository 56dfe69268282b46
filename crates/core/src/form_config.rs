//! Partner-configurable form configs.
//!
//! A form config is an ordered list of sections, each an ordered list of
//! typed fields. It is stored as JSON next to its id; the stored document
//! also carries rendering hints (labels, component props) that the engine
//! ignores.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::attribute::ValueKind;
use crate::error::FormConfigError;

/// Attendance attributes that a form config may expose but which are stored
/// on the report detail and lesson member, never as dynamic field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemDefinedField {
    AttendanceStatus,
    AttendanceRemark,
    AttendanceNotice,
    AttendanceReason,
    AttendanceNote,
}

impl SystemDefinedField {
    pub const ALL: [SystemDefinedField; 5] = [
        SystemDefinedField::AttendanceStatus,
        SystemDefinedField::AttendanceRemark,
        SystemDefinedField::AttendanceNotice,
        SystemDefinedField::AttendanceReason,
        SystemDefinedField::AttendanceNote,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SystemDefinedField::AttendanceStatus => "attendance_status",
            SystemDefinedField::AttendanceRemark => "attendance_remark",
            SystemDefinedField::AttendanceNotice => "attendance_notice",
            SystemDefinedField::AttendanceReason => "attendance_reason",
            SystemDefinedField::AttendanceNote => "attendance_note",
        }
    }

    pub fn from_field_id(field_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == field_id)
    }

    pub fn is_system_defined(field_id: &str) -> bool {
        Self::from_field_id(field_id).is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfigField {
    #[serde(default)]
    pub field_id: String,
    /// Raw wire name of the declared [`ValueKind`]. Kept as text so that a
    /// stored config with an unknown type still parses and is rejected by
    /// [`FormConfig::is_valid`] with a precise reason.
    #[serde(default)]
    pub value_type: String,
    #[serde(default)]
    pub is_required: bool,
}

impl FormConfigField {
    pub fn new(field_id: impl Into<String>, kind: ValueKind, is_required: bool) -> Self {
        Self {
            field_id: field_id.into(),
            value_type: kind.as_str().to_string(),
            is_required,
        }
    }

    pub fn value_kind(&self) -> Result<ValueKind, FormConfigError> {
        self.value_type.parse()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfigSection {
    #[serde(default)]
    pub section_id: String,
    #[serde(default)]
    pub fields: Vec<FormConfigField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfigData {
    #[serde(default)]
    pub sections: Vec<FormConfigSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    pub form_config_id: String,
    pub data: FormConfigData,
}

impl FormConfig {
    pub fn new(form_config_id: impl Into<String>, sections: Vec<FormConfigSection>) -> Self {
        Self {
            form_config_id: form_config_id.into(),
            data: FormConfigData { sections },
        }
    }

    /// Parse a stored form config document. A JSON `null` yields an empty
    /// config; unknown keys are ignored.
    pub fn from_stored(
        form_config_id: impl Into<String>,
        data: &serde_json::Value,
    ) -> Result<Self, FormConfigError> {
        let data = if data.is_null() {
            FormConfigData::default()
        } else {
            FormConfigData::deserialize(data).map_err(|e| FormConfigError::Parse(e.to_string()))?
        };
        Ok(Self {
            form_config_id: form_config_id.into(),
            data,
        })
    }

    /// Check structural invariants, returning the first violation.
    ///
    /// Section ids are unique; field ids are unique across the whole config
    /// (not per section); every field has a known value type; and any
    /// system-defined field is typed `VALUE_TYPE_STRING`.
    pub fn is_valid(&self) -> Result<(), FormConfigError> {
        if self.form_config_id.is_empty() {
            return Err(FormConfigError::EmptyFormConfigId);
        }

        let mut section_ids = HashSet::new();
        let mut field_ids = HashSet::new();
        for section in &self.data.sections {
            if section.section_id.is_empty() {
                return Err(FormConfigError::EmptySectionId);
            }
            if !section_ids.insert(section.section_id.as_str()) {
                return Err(FormConfigError::DuplicateSectionId(
                    section.section_id.clone(),
                ));
            }

            for field in &section.fields {
                if field.field_id.is_empty() {
                    return Err(FormConfigError::EmptyFieldId {
                        section_id: section.section_id.clone(),
                    });
                }
                if !field_ids.insert(field.field_id.as_str()) {
                    return Err(FormConfigError::DuplicateFieldId(field.field_id.clone()));
                }
                if field.value_type.is_empty() {
                    return Err(FormConfigError::MissingValueType(field.field_id.clone()));
                }
                let kind =
                    field
                        .value_kind()
                        .map_err(|_| FormConfigError::InvalidValueType {
                            field_id: field.field_id.clone(),
                            value_type: field.value_type.clone(),
                        })?;
                if SystemDefinedField::is_system_defined(&field.field_id)
                    && kind != ValueKind::String
                {
                    return Err(FormConfigError::SystemFieldValueType {
                        field_id: field.field_id.clone(),
                        value_type: field.value_type.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormConfigField> {
        self.data.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field_ids(&self) -> Vec<&str> {
        self.fields().map(|f| f.field_id.as_str()).collect()
    }

    /// All fields keyed by id. On a malformed config with duplicate ids the
    /// last occurrence wins.
    pub fn fields_by_id(&self) -> HashMap<&str, &FormConfigField> {
        self.fields().map(|f| (f.field_id.as_str(), f)).collect()
    }

    pub fn required_fields_by_id(&self) -> HashMap<&str, &FormConfigField> {
        self.fields()
            .filter(|f| f.is_required)
            .map(|f| (f.field_id.as_str(), f))
            .collect()
    }
}
