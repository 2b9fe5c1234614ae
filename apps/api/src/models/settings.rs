use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ja,
    En,
}

/// User preferences. Work hours are "HH:MM" local times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub work_hours_start: String,
    pub work_hours_end: String,
    /// Minutes.
    pub break_duration: u32,
    pub theme: Theme,
    pub language: Language,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            work_hours_start: "09:00".to_string(),
            work_hours_end: "18:00".to_string(),
            break_duration: 15,
            theme: Theme::System,
            language: Language::Ja,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"theme": "dark"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.work_hours_start, "09:00");
        assert_eq!(settings.break_duration, 15);
        assert_eq!(settings.language, Language::Ja);
    }
}
