//! Damage classes and their display colors.

use serde::{Deserialize, Serialize};

/// RGB display color.
pub type Color = [u8; 3];

pub const RED: Color = [255, 0, 0];
pub const DARK_BLUE: Color = [0, 0, 139];
pub const BLUE: Color = [0, 0, 255];
pub const ORANGE: Color = [255, 165, 0];
pub const PURPLE: Color = [128, 0, 128];
/// Fallback for labels outside the known damage classes.
pub const GREEN: Color = [0, 255, 0];

/// Road damage categories the detector and classifiers are trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageClass {
    Pothole,
    LongitudinalCrack,
    LateralCrack,
    AlligatorCrack,
}

impl DamageClass {
    /// All classes, in classifier output order.
    pub const ALL: [DamageClass; 4] = [
        DamageClass::Pothole,
        DamageClass::LongitudinalCrack,
        DamageClass::LateralCrack,
        DamageClass::AlligatorCrack,
    ];

    /// Parse a model label. Case is ignored and `_` is treated as a space,
    /// so `"alligator_crack"` and `"Alligator Crack"` are the same class.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().replace('_', " ").to_lowercase();
        if normalized.contains("pothole") {
            Some(DamageClass::Pothole)
        } else if normalized.contains("longitudinal") {
            Some(DamageClass::LongitudinalCrack)
        } else if normalized.contains("lateral") {
            Some(DamageClass::LateralCrack)
        } else if normalized.contains("alligator") {
            Some(DamageClass::AlligatorCrack)
        } else {
            None
        }
    }

    /// Snake-case label as emitted by the multi-label classifier.
    pub fn label(&self) -> &'static str {
        match self {
            DamageClass::Pothole => "pothole",
            DamageClass::LongitudinalCrack => "longitudinal_crack",
            DamageClass::LateralCrack => "lateral_crack",
            DamageClass::AlligatorCrack => "alligator_crack",
        }
    }
}

impl std::fmt::Display for DamageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Color scheme used to paint detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Surface damage (potholes, alligator cracking) in red, line cracks in dark blue.
    #[default]
    Grouped,
    /// One color per class.
    Distinct,
}

impl Palette {
    pub fn color(&self, class: Option<DamageClass>) -> Color {
        match (self, class) {
            (_, None) => GREEN,
            (Palette::Grouped, Some(DamageClass::Pothole | DamageClass::AlligatorCrack)) => RED,
            (Palette::Grouped, Some(DamageClass::LongitudinalCrack | DamageClass::LateralCrack)) => {
                DARK_BLUE
            }
            (Palette::Distinct, Some(DamageClass::Pothole)) => RED,
            (Palette::Distinct, Some(DamageClass::LongitudinalCrack)) => BLUE,
            (Palette::Distinct, Some(DamageClass::LateralCrack)) => ORANGE,
            (Palette::Distinct, Some(DamageClass::AlligatorCrack)) => PURPLE,
        }
    }

    /// Color for a raw model label.
    pub fn color_for(&self, label: &str) -> Color {
        self.color(DamageClass::from_label(label))
    }
}
