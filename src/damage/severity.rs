//! Severity scoring over a set of detections.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::damage::detection::Detection;

/// Qualitative damage level for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    #[default]
    Low,
    Moderate,
    High,
    Severe,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Low => "low",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::High => "high",
            SeverityLevel::Severe => "severe",
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count and area limits for one level. A level is reached when any limit
/// is strictly exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelThreshold {
    pub count: usize,
    pub area: f32,
    /// Distinct class limit; `None` disables the check for this level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<usize>,
}

impl LevelThreshold {
    fn exceeded_by(&self, report: &SeverityReport) -> bool {
        report.count_score > self.count
            || report.area_score > self.area
            || self.types.is_some_and(|types| report.type_score > types)
    }
}

/// Limits for each level above `Low`, checked from most to least severe.
///
/// When deserialized, every field left out keeps its default, so
/// `[severity.high] count = 8` only moves the high count limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ThresholdOverrides")]
pub struct SeverityThresholds {
    pub severe: LevelThreshold,
    pub high: LevelThreshold,
    pub moderate: LevelThreshold,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            severe: LevelThreshold {
                count: 15,
                area: 50.0,
                types: None,
            },
            high: LevelThreshold {
                count: 10,
                area: 30.0,
                types: None,
            },
            moderate: LevelThreshold {
                count: 5,
                area: 15.0,
                types: Some(2),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThresholdOverrides {
    severe: LevelOverride,
    high: LevelOverride,
    moderate: LevelOverride,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LevelOverride {
    count: Option<usize>,
    area: Option<f32>,
    types: Option<usize>,
}

impl LevelOverride {
    fn apply(self, base: LevelThreshold) -> LevelThreshold {
        LevelThreshold {
            count: self.count.unwrap_or(base.count),
            area: self.area.unwrap_or(base.area),
            types: self.types.or(base.types),
        }
    }
}

impl From<ThresholdOverrides> for SeverityThresholds {
    fn from(overrides: ThresholdOverrides) -> Self {
        let base = Self::default();
        Self {
            severe: overrides.severe.apply(base.severe),
            high: overrides.high.apply(base.high),
            moderate: overrides.moderate.apply(base.moderate),
        }
    }
}

impl SeverityThresholds {
    /// First level, from `Severe` down, whose limits the scores exceed.
    pub fn classify(&self, report: &SeverityReport) -> SeverityLevel {
        if self.severe.exceeded_by(report) {
            SeverityLevel::Severe
        } else if self.high.exceeded_by(report) {
            SeverityLevel::High
        } else if self.moderate.exceeded_by(report) {
            SeverityLevel::Moderate
        } else {
            SeverityLevel::Low
        }
    }
}

/// Severity of one image, derived from its detections.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeverityReport {
    pub level: SeverityLevel,
    /// Number of detections
    pub count_score: usize,
    /// Sum of relative areas, in percent of the image
    pub area_score: f32,
    /// Number of distinct class labels
    pub type_score: usize,
}

/// Score detections with the default thresholds.
pub fn score_severity(detections: &[Detection]) -> SeverityReport {
    score_severity_with(detections, &SeverityThresholds::default())
}

pub fn score_severity_with(
    detections: &[Detection],
    thresholds: &SeverityThresholds,
) -> SeverityReport {
    let labels: HashSet<&str> = detections.iter().map(|d| d.label.as_str()).collect();
    let mut report = SeverityReport {
        level: SeverityLevel::Low,
        count_score: detections.len(),
        area_score: detections.iter().map(|d| d.rel_area).sum(),
        type_score: labels.len(),
    };
    report.level = thresholds.classify(&report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dets(labels: &[&str], rel_area: f32) -> Vec<Detection> {
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let x = i as f32 * 20.0;
                Detection::new(x, 0.0, x + 10.0, 10.0, *label, 0.9).with_relative_area(rel_area)
            })
            .collect()
    }

    fn report(count: usize, area: f32, types: usize) -> SeverityReport {
        SeverityReport {
            level: SeverityLevel::Low,
            count_score: count,
            area_score: area,
            type_score: types,
        }
    }

    #[test]
    fn test_empty_is_low() {
        let r = score_severity(&[]);
        assert_eq!(r, SeverityReport::default());
        assert_eq!(r.level, SeverityLevel::Low);
    }

    #[test]
    fn test_area_dominates() {
        let r = score_severity(&dets(&["pothole"; 6], 20.0));
        assert_eq!(r.count_score, 6);
        assert_eq!(r.area_score, 120.0);
        assert_eq!(r.type_score, 1);
        assert_eq!(r.level, SeverityLevel::Severe);
    }

    #[test]
    fn test_type_triggers_moderate() {
        let r = score_severity(&dets(&["pothole", "lateral crack", "alligator crack"], 1.0));
        assert_eq!((r.count_score, r.type_score), (3, 3));
        assert_eq!(r.area_score, 3.0);
        assert_eq!(r.level, SeverityLevel::Moderate);
    }

    #[test]
    fn test_cascade_picks_most_severe() {
        let t = SeverityThresholds::default();
        assert_eq!(t.classify(&report(20, 0.0, 1)), SeverityLevel::Severe);
        assert_eq!(t.classify(&report(11, 0.0, 4)), SeverityLevel::High);
        assert_eq!(t.classify(&report(0, 30.5, 1)), SeverityLevel::High);
        assert_eq!(t.classify(&report(6, 0.0, 1)), SeverityLevel::Moderate);
        assert_eq!(t.classify(&report(0, 15.1, 1)), SeverityLevel::Moderate);
    }

    #[test]
    fn test_boundaries_are_strict() {
        let t = SeverityThresholds::default();
        assert_eq!(t.classify(&report(5, 15.0, 2)), SeverityLevel::Low);
        assert_eq!(t.classify(&report(10, 30.0, 2)), SeverityLevel::Moderate);
        assert_eq!(t.classify(&report(15, 50.0, 2)), SeverityLevel::High);
    }

    #[test]
    fn test_type_score_ignored_above_moderate() {
        let t = SeverityThresholds::default();
        assert_eq!(t.classify(&report(1, 1.0, 4)), SeverityLevel::Moderate);
    }

    #[test]
    fn test_scores_monotonic() {
        let mut set = dets(&["pothole", "pothole"], 4.0);
        let before = score_severity(&set);
        set.push(Detection::new(50.0, 50.0, 60.0, 60.0, "lateral crack", 0.4).with_relative_area(1.0));
        let after = score_severity(&set);
        assert!(after.count_score >= before.count_score);
        assert!(after.area_score >= before.area_score);
        assert!(after.type_score >= before.type_score);
        assert!(after.level >= before.level);
    }

    #[test]
    fn test_level_order_and_json() {
        assert!(SeverityLevel::Low < SeverityLevel::Moderate);
        assert!(SeverityLevel::High < SeverityLevel::Severe);
        assert_eq!(
            serde_json::to_string(&SeverityLevel::Moderate).unwrap(),
            "\"moderate\""
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let mut t = SeverityThresholds::default();
        t.moderate.types = None;
        let r = score_severity_with(&dets(&["pothole", "lateral crack", "alligator crack"], 1.0), &t);
        assert_eq!(r.level, SeverityLevel::Low);
    }

    #[test]
    fn test_partial_thresholds_keep_defaults() {
        let t: SeverityThresholds =
            serde_json::from_str(r#"{"high":{"count":8},"moderate":{"area":10.0}}"#).unwrap();
        let defaults = SeverityThresholds::default();

        assert_eq!(t.severe, defaults.severe);
        assert_eq!(t.high.count, 8);
        assert_eq!(t.high.area, 30.0);
        assert_eq!(t.high.types, None);
        assert_eq!(t.moderate.count, 5);
        assert_eq!(t.moderate.area, 10.0);
        assert_eq!(t.moderate.types, Some(2));
        assert_eq!(t.classify(&report(1, 1.0, 3)), SeverityLevel::Moderate);
    }

    #[test]
    fn test_thresholds_json_round_trip() {
        let mut t = SeverityThresholds::default();
        t.severe.types = Some(4);
        let back: SeverityThresholds = serde_json::from_str(&serde_json::to_string(&t).unwrap()).unwrap();
        assert_eq!(back, t);
    }
}
