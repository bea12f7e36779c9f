//! Assessment configuration, loaded from TOML.
//!
//! Every section is optional; missing keys fall back to the defaults the
//! scoring functions use on their own.
//!
//! ```toml
//! palette = "distinct"
//! min_confidence = 0.25
//!
//! [merge]
//! enabled = true
//! iou_threshold = 0.5
//!
//! [severity.moderate]
//! count = 5
//! area = 15.0
//! types = 2
//!
//! [labels]
//! longitudinal_crack = 0.3
//! lateral_crack = 0.3
//!
//! [road]
//! threshold = 0.3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::damage::{
    DEFAULT_IOU_THRESHOLD, DEFAULT_ROAD_THRESHOLD, LabelThresholds, Palette, SeverityThresholds,
};
use crate::error::{Error, Result};

/// Detections below this confidence are dropped before scoring.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessConfig {
    pub palette: Palette,
    pub min_confidence: f32,
    pub merge: MergeConfig,
    pub severity: SeverityThresholds,
    pub labels: LabelThresholds,
    pub road: RoadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub enabled: bool,
    pub iou_threshold: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    pub threshold: f32,
}

impl Default for AssessConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            merge: MergeConfig::default(),
            severity: SeverityThresholds::default(),
            labels: LabelThresholds::default(),
            road: RoadConfig::default(),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ROAD_THRESHOLD,
        }
    }
}

impl AssessConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(AssessConfig::from_toml_str("").unwrap(), AssessConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = AssessConfig::from_toml_str(
            r#"
palette = "distinct"

[merge]
enabled = true

[severity.moderate]
count = 3
area = 10.0

[labels]
lateral_crack = 0.3
"#,
        )
        .unwrap();

        assert_eq!(config.palette, Palette::Distinct);
        assert!(config.merge.enabled);
        assert_eq!(config.merge.iou_threshold, DEFAULT_IOU_THRESHOLD);
        assert_eq!(config.severity.moderate.count, 3);
        assert_eq!(config.severity.moderate.types, Some(2));
        assert_eq!(config.severity.severe.count, 15);
        assert_eq!(config.labels.lateral_crack, 0.3);
        assert_eq!(config.labels.longitudinal_crack, 0.4);
        assert_eq!(config.road.threshold, DEFAULT_ROAD_THRESHOLD);
    }

    #[test]
    fn test_single_severity_field() {
        let config = AssessConfig::from_toml_str("[severity.high]\ncount = 8\n").unwrap();
        assert_eq!(config.severity.high.count, 8);
        assert_eq!(config.severity.high.area, 30.0);
        assert_eq!(config.severity.moderate, SeverityThresholds::default().moderate);
    }

    #[test]
    fn test_invalid_config() {
        let err = AssessConfig::from_toml_str("palette = \"rainbow\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_confidence = 0.5").unwrap();
        let config = AssessConfig::from_path(file.path()).unwrap();
        assert_eq!(config.min_confidence, 0.5);
    }

    #[test]
    fn test_missing_file() {
        let err = AssessConfig::from_path("/nonexistent/road-severity.toml").unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
