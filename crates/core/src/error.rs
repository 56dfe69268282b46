/// Structural problems with a form config, either while parsing its stored
/// JSON or while validating the parsed shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormConfigError {
    /// The stored `form_config_data` is not valid JSON for a form config.
    #[error("could not parse form config data: {0}")]
    Parse(String),

    #[error("form_config_id could not be empty")]
    EmptyFormConfigId,

    #[error("section_id could not be empty")]
    EmptySectionId,

    #[error("section_id {0} is duplicated")]
    DuplicateSectionId(String),

    #[error("field_id of section {section_id} could not be empty")]
    EmptyFieldId { section_id: String },

    #[error("field_id {0} is duplicated")]
    DuplicateFieldId(String),

    #[error("value_type of field {0} could not be empty")]
    MissingValueType(String),

    #[error("unknown value_type {0}")]
    UnknownValueType(String),

    #[error("field {field_id} has unknown value_type {value_type}")]
    InvalidValueType {
        field_id: String,
        value_type: String,
    },

    /// A system-reserved attendance field declared with a non-string type.
    #[error("system field {field_id} must have value_type VALUE_TYPE_STRING, got {value_type}")]
    SystemFieldValueType {
        field_id: String,
        value_type: String,
    },
}
