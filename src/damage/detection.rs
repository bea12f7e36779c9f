//! Damage detections and their JSON record form.

use serde::{Deserialize, Serialize};

use crate::damage::palette::{Color, DamageClass, Palette};
use crate::damage::rect::Rect;

/// One detected defect in one image.
///
/// Relative measures are percentages of the image (0-100 scale) and are
/// computed once by [`Detection::measured`] or set explicitly; scoring only
/// ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "DetectionRecord")]
pub struct Detection {
    /// Bounding box in pixel coordinates
    pub bbox: Rect,
    /// Class label as reported by the detector
    pub label: String,
    /// Detection confidence in [0, 1]
    pub confidence: f32,
    /// Display color
    pub color: Color,
    /// Box width as a percentage of image width
    pub rel_width: f32,
    /// Box height as a percentage of image height
    pub rel_height: f32,
    /// Box area as a percentage of image area
    pub rel_area: f32,
}

impl Detection {
    /// Create a detection from a TLBR box. Relative measures start at zero and
    /// the color comes from the default palette.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, label: impl Into<String>, confidence: f32) -> Self {
        Self::from_rect(Rect::from_tlbr(x1, y1, x2, y2), label, confidence)
    }

    pub fn from_rect(bbox: Rect, label: impl Into<String>, confidence: f32) -> Self {
        let label = label.into();
        let color = Palette::default().color_for(&label);
        Self {
            bbox,
            label,
            confidence,
            color,
            rel_width: 0.0,
            rel_height: 0.0,
            rel_area: 0.0,
        }
    }

    /// Compute relative measures against an image of the given size, rounded
    /// to two decimals. Scoring sums these rounded percentages.
    /// A zero dimension leaves the corresponding measures at zero.
    pub fn measured(mut self, image_width: u32, image_height: u32) -> Self {
        let (w, h) = (image_width as f32, image_height as f32);
        if w > 0.0 {
            self.rel_width = round_to(self.width() / w * 100.0, 2);
        }
        if h > 0.0 {
            self.rel_height = round_to(self.height() / h * 100.0, 2);
        }
        if w > 0.0 && h > 0.0 {
            self.rel_area = round_to(self.area() / (w * h) * 100.0, 2);
        }
        self
    }

    pub fn with_relative_area(mut self, rel_area: f32) -> Self {
        self.rel_area = rel_area;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Same detection with a different box. Relative measures are rescaled by
    /// this detection's own pixel-to-percent ratio; a zero-sized box keeps them.
    pub fn with_bbox(&self, bbox: Rect) -> Self {
        let scale = |rel: f32, old: f32, new: f32| {
            if old > 0.0 { round_to(rel / old * new, 2) } else { rel }
        };
        Self {
            bbox,
            label: self.label.clone(),
            confidence: self.confidence,
            color: self.color,
            rel_width: scale(self.rel_width, self.width(), bbox.width),
            rel_height: scale(self.rel_height, self.height(), bbox.height),
            rel_area: scale(self.rel_area, self.area(), bbox.area()),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.bbox.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bbox.height
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.bbox.area()
    }

    /// Known damage class of this detection's label, if any.
    pub fn class(&self) -> Option<DamageClass> {
        DamageClass::from_label(&self.label)
    }
}

/// JSON shape of a detection.
///
/// Only `bbox`, `class` and `conf` are required when reading; derived fields
/// are recomputed by [`DetectionRecord::into_detection`] when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub bbox: [f32; 4],
    pub class: String,
    pub conf: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel_height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel_area: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl DetectionRecord {
    /// Build a detection, measuring it against the image and painting it with
    /// `palette` unless the record already carries those values.
    pub fn into_detection(self, image_width: u32, image_height: u32, palette: Palette) -> Detection {
        let [x1, y1, x2, y2] = self.bbox;
        let mut detection =
            Detection::new(x1, y1, x2, y2, self.class, self.conf).measured(image_width, image_height);
        detection.color = self
            .color
            .unwrap_or_else(|| palette.color(detection.class()));
        if let Some(rel_width) = self.rel_width {
            detection.rel_width = rel_width;
        }
        if let Some(rel_height) = self.rel_height {
            detection.rel_height = rel_height;
        }
        if let Some(rel_area) = self.rel_area {
            detection.rel_area = rel_area;
        }
        detection
    }
}

impl From<Detection> for DetectionRecord {
    fn from(det: Detection) -> Self {
        Self {
            bbox: det.bbox.to_tlbr(),
            conf: round_to(det.confidence, 2),
            width: Some(round_to(det.width(), 1)),
            height: Some(round_to(det.height(), 1)),
            area: Some(round_to(det.area(), 1)),
            rel_width: Some(round_to(det.rel_width, 2)),
            rel_height: Some(round_to(det.rel_height, 2)),
            rel_area: Some(round_to(det.rel_area, 2)),
            color: Some(det.color),
            class: det.label,
        }
    }
}

pub(crate) fn round_to(value: f32, places: i32) -> f32 {
    let factor = 10f32.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::palette::{DARK_BLUE, PURPLE, RED};

    #[test]
    fn test_measured() {
        let det = Detection::new(0.0, 0.0, 64.0, 48.0, "pothole", 0.9).measured(640, 480);
        assert!((det.rel_width - 10.0).abs() < 1e-4);
        assert!((det.rel_height - 10.0).abs() < 1e-4);
        assert!((det.rel_area - 1.0).abs() < 1e-4);
        assert_eq!(det.color, RED);
    }

    #[test]
    fn test_measured_rounds_percentages() {
        // 150040 px of a 1000x1000 image is 15.004 %
        let det = Detection::new(0.0, 0.0, 400.0, 375.1, "pothole", 0.9).measured(1000, 1000);
        assert_eq!(det.rel_area, 15.0);
        assert_eq!(det.rel_width, 40.0);
        assert_eq!(det.rel_height, 37.51);
    }

    #[test]
    fn test_class_from_label() {
        let det = Detection::new(0.0, 0.0, 1.0, 1.0, "Lateral_Crack", 0.9);
        assert_eq!(det.class(), Some(DamageClass::LateralCrack));
        assert_eq!(det.color, DARK_BLUE);
        assert_eq!(Detection::new(0.0, 0.0, 1.0, 1.0, "manhole", 0.9).class(), None);
    }

    #[test]
    fn test_measured_zero_image() {
        let det = Detection::new(0.0, 0.0, 10.0, 10.0, "pothole", 0.9).measured(0, 0);
        assert_eq!(det.rel_area, 0.0);
    }

    #[test]
    fn test_with_bbox_rescales() {
        let det = Detection::new(0.0, 0.0, 10.0, 10.0, "pothole", 0.9).with_relative_area(2.0);
        let grown = det.with_bbox(Rect::from_tlbr(0.0, 0.0, 20.0, 10.0));
        assert!((grown.rel_area - 4.0).abs() < 1e-6);
        assert_eq!(grown.label, "pothole");
    }

    #[test]
    fn test_record_output_shape() {
        let det = Detection::new(1.0, 2.0, 11.0, 22.0, "longitudinal crack", 0.876)
            .measured(100, 100);
        let value = serde_json::to_value(&det).unwrap();
        assert_eq!(value["class"], "longitudinal crack");
        assert_eq!(value["bbox"], serde_json::json!([1.0, 2.0, 11.0, 22.0]));
        assert_eq!(value["area"], serde_json::json!(200.0));
        assert_eq!(value["rel_area"], serde_json::json!(2.0));
        assert_eq!(value["color"], serde_json::json!(DARK_BLUE));
        let conf = value["conf"].as_f64().unwrap();
        assert!((conf - 0.88).abs() < 1e-6);
    }

    #[test]
    fn test_record_minimal_input() {
        let record: DetectionRecord =
            serde_json::from_str(r#"{"bbox":[0,0,50,50],"class":"alligator_crack","conf":0.7}"#)
                .unwrap();
        let det = record.into_detection(100, 100, Palette::Distinct);
        assert!((det.rel_area - 25.0).abs() < 1e-4);
        assert_eq!(det.color, PURPLE);
    }

    #[test]
    fn test_record_keeps_supplied_fields() {
        let record: DetectionRecord = serde_json::from_str(
            r#"{"bbox":[0,0,5,5],"class":"pothole","conf":0.5,"rel_area":20.0,"color":[1,2,3]}"#,
        )
        .unwrap();
        let det = record.into_detection(0, 0, Palette::Grouped);
        assert_eq!(det.rel_area, 20.0);
        assert_eq!(det.color, [1, 2, 3]);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.26, 1), 1.3);
        assert_eq!(round_to(0.5, 0), 1.0);
    }
}
