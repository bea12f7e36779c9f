//! Classifier score thresholding.

use serde::{Deserialize, Serialize};

use crate::damage::palette::DamageClass;
use crate::error::{Error, Result};

/// Confidence below which the road classifier's output means "not a road".
pub const DEFAULT_ROAD_THRESHOLD: f32 = 0.3;

/// Per-class thresholds for the multi-label damage classifier.
///
/// Scores arrive in [`DamageClass::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    pub pothole: f32,
    pub longitudinal_crack: f32,
    pub lateral_crack: f32,
    pub alligator_crack: f32,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            pothole: 0.01,
            longitudinal_crack: 0.4,
            lateral_crack: 0.4,
            alligator_crack: 0.01,
        }
    }
}

impl LabelThresholds {
    pub fn threshold(&self, class: DamageClass) -> f32 {
        match class {
            DamageClass::Pothole => self.pothole,
            DamageClass::LongitudinalCrack => self.longitudinal_crack,
            DamageClass::LateralCrack => self.lateral_crack,
            DamageClass::AlligatorCrack => self.alligator_crack,
        }
    }

    /// Classes whose score is strictly above their threshold.
    pub fn predict_labels(&self, scores: &[f32]) -> Result<Vec<DamageClass>> {
        if scores.len() != DamageClass::ALL.len() {
            return Err(Error::ScoreCount {
                expected: DamageClass::ALL.len(),
                got: scores.len(),
            });
        }
        Ok(DamageClass::ALL
            .iter()
            .zip(scores)
            .filter(|(class, score)| **score > self.threshold(**class))
            .map(|(class, _)| *class)
            .collect())
    }
}

/// Output of the binary road classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoadVerdict {
    Road,
    NotRoad,
}

impl RoadVerdict {
    pub fn from_confidence(confidence: f32, threshold: f32) -> Self {
        if confidence < threshold {
            RoadVerdict::NotRoad
        } else {
            RoadVerdict::Road
        }
    }

    pub fn is_road(&self) -> bool {
        matches!(self, RoadVerdict::Road)
    }
}

impl std::fmt::Display for RoadVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoadVerdict::Road => f.write_str("Road"),
            RoadVerdict::NotRoad => f.write_str("Not a Road"),
        }
    }
}
