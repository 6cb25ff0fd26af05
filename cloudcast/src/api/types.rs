//! Wire types for the cloudcasting API.

use chrono::DateTime;
use serde::Deserialize;

/// Dataset metadata from the `data-info` endpoint.
///
/// Metadata is advisory: a fetch failure is recorded in [`error`] rather
/// than surfaced as a hard error, and all fields default so a partial
/// payload still parses.
///
/// [`error`]: DataInfo::error
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DataInfo {
    #[serde(default)]
    pub file_exists: bool,
    #[serde(default)]
    pub init_time: Option<String>,
    #[serde(default)]
    pub forecast_steps: Vec<u32>,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub file_size_mb: f64,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub time_range: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DataInfo {
    /// A record describing a failed fetch.
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// The best human-readable timestamp for display, falling back through
    /// init time, last-modified, time range, and bare file info.
    pub fn best_time_display(&self) -> String {
        if let Some(init) = &self.init_time {
            return format_iso_time(init);
        }
        if let Some(modified) = &self.last_modified {
            return format_iso_time(modified);
        }
        if let Some(range) = &self.time_range {
            return range.clone();
        }
        if self.file_exists {
            return format!("Data file ({:.2} MB)", self.file_size_mb);
        }
        "No timestamp available".to_string()
    }
}

/// Format an ISO-8601 timestamp for display, e.g. `12 Mar 2025 06:45`.
fn format_iso_time(iso: &str) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(dt) => dt.format("%d %b %Y %H:%M").to_string(),
        Err(_) => "Invalid date".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_sets_error_and_clears_file_flag() {
        let info = DataInfo::unavailable("API error: 500");
        assert_eq!(info.error.as_deref(), Some("API error: 500"));
        assert!(!info.file_exists);
        assert!(info.forecast_steps.is_empty());
    }

    #[test]
    fn test_parses_partial_payload() {
        let info: DataInfo = serde_json::from_str(r#"{"file_exists":true}"#).unwrap();
        assert!(info.file_exists);
        assert!(info.init_time.is_none());
        assert!(info.error.is_none());
    }

    #[test]
    fn test_best_time_prefers_init_time() {
        let info = DataInfo {
            init_time: Some("2025-03-12T06:45:00+00:00".to_string()),
            last_modified: Some("2025-03-12T07:00:00+00:00".to_string()),
            ..DataInfo::default()
        };
        assert_eq!(info.best_time_display(), "12 Mar 2025 06:45");
    }

    #[test]
    fn test_best_time_falls_back_through_chain() {
        let info = DataInfo {
            time_range: Some("06:45 - 09:45".to_string()),
            ..DataInfo::default()
        };
        assert_eq!(info.best_time_display(), "06:45 - 09:45");

        let info = DataInfo {
            file_exists: true,
            file_size_mb: 42.5,
            ..DataInfo::default()
        };
        assert_eq!(info.best_time_display(), "Data file (42.50 MB)");

        assert_eq!(DataInfo::default().best_time_display(), "No timestamp available");
    }

    #[test]
    fn test_invalid_timestamp_reported() {
        let info = DataInfo {
            init_time: Some("yesterday-ish".to_string()),
            ..DataInfo::default()
        };
        assert_eq!(info.best_time_display(), "Invalid date");
    }
}
