//! Caller-supplied configuration.
//!
//! Both structs deserialize with every field optional, so a host can pass
//! `{}` and get the defaults.

use serde::{Deserialize, Serialize};

/// Which row fields hold the time, event, and group values.
///
/// # Examples
///
/// ```
/// use u_survival::config::FieldMapping;
///
/// let mapping: FieldMapping = serde_json::from_str(r#"{"time_field": "months"}"#).unwrap();
/// assert_eq!(mapping.time_field, "months");
/// assert_eq!(mapping.event_field, "event");
/// assert_eq!(mapping.default_group, "All");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Field holding follow-up time. Default: `"time"`.
    pub time_field: String,
    /// Field holding the event indicator. Default: `"event"`.
    pub event_field: String,
    /// Field holding the group label. Default: `"group"`.
    pub group_field: String,
    /// Label used for rows that have no group field. Default: `"All"`.
    pub default_group: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            time_field: "time".to_string(),
            event_field: "event".to_string(),
            group_field: "group".to_string(),
            default_group: "All".to_string(),
        }
    }
}

impl FieldMapping {
    /// Mapping for the given time, event, and group field names.
    pub fn new(
        time_field: impl Into<String>,
        event_field: impl Into<String>,
        group_field: impl Into<String>,
    ) -> Self {
        Self {
            time_field: time_field.into(),
            event_field: event_field.into(),
            group_field: group_field.into(),
            ..Self::default()
        }
    }
}

/// Settings for narrative synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Significance threshold named in the closing methods sentence. Default: 0.05.
    pub alpha: f64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self { alpha: 0.05 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let mapping: FieldMapping = serde_json::from_str("{}").expect("valid");
        assert_eq!(mapping, FieldMapping::default());
        let cfg: NarrativeConfig = serde_json::from_str("{}").expect("valid");
        assert!((cfg.alpha - 0.05).abs() < 1e-12);
    }

    #[test]
    fn new_keeps_default_group() {
        let mapping = FieldMapping::new("os_months", "died", "arm");
        assert_eq!(mapping.time_field, "os_months");
        assert_eq!(mapping.event_field, "died");
        assert_eq!(mapping.group_field, "arm");
        assert_eq!(mapping.default_group, "All");
    }
}
