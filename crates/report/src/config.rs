use lesson_report_core::{
    TeachingMethod, FEATURE_NAME_GROUP_LESSON_REPORT, FEATURE_NAME_INDIVIDUAL_LESSON_REPORT,
};
use serde::{Deserialize, Serialize};

/// Engine settings. Every key is optional when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Form config feature looked up for individual lessons.
    pub individual_feature_name: String,
    /// Form config feature looked up for group lessons.
    pub group_feature_name: String,
    /// Mark the lesson completed after a final submit in which every
    /// student has an attendance status.
    pub complete_lesson_on_full_attendance: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            individual_feature_name: FEATURE_NAME_INDIVIDUAL_LESSON_REPORT.to_string(),
            group_feature_name: FEATURE_NAME_GROUP_LESSON_REPORT.to_string(),
            complete_lesson_on_full_attendance: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn feature_name_for(&self, teaching_method: TeachingMethod) -> &str {
        match teaching_method {
            TeachingMethod::Group => &self.group_feature_name,
            TeachingMethod::Individual => &self.individual_feature_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{ "complete_lesson_on_full_attendance": true }"#)
                .unwrap();
        assert!(config.complete_lesson_on_full_attendance);
        assert_eq!(
            config.individual_feature_name,
            FEATURE_NAME_INDIVIDUAL_LESSON_REPORT
        );
        assert_eq!(config.group_feature_name, FEATURE_NAME_GROUP_LESSON_REPORT);
    }

    #[test]
    fn feature_name_follows_teaching_method() {
        let config = EngineConfig {
            group_feature_name: "GROUP_V2".to_string(),
            ..EngineConfig::default()
        };
        assert_eq!(config.feature_name_for(TeachingMethod::Group), "GROUP_V2");
        assert_eq!(
            config.feature_name_for(TeachingMethod::Individual),
            FEATURE_NAME_INDIVIDUAL_LESSON_REPORT
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(EngineConfig::from_json_str("{ not json").is_err());
    }
}
