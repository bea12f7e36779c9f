//! Builder for creating Detection objects from various input formats.

use crate::damage::{Detection, Palette, Rect};

use super::RawDetection;

/// Builder for creating `Detection` objects from various box formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    bbox: Rect,
    label: String,
    confidence: f32,
    palette: Palette,
    image_size: Option<(u32, u32)>,
    rel_area: Option<f32>,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = Rect::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::from_center(cx, cy, w, h);
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(x, y, w, h);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the confidence score.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Image the box belongs to; relative measures are computed against it.
    pub fn image_size(mut self, width: u32, height: u32) -> Self {
        self.image_size = Some((width, height));
        self
    }

    /// Use this relative area instead of computing it from the image size.
    pub fn relative_area(mut self, rel_area: f32) -> Self {
        self.rel_area = Some(rel_area);
        self
    }

    /// Start from a detector's raw output.
    pub fn raw(self, raw: RawDetection) -> Self {
        let [x1, y1, x2, y2] = raw.bbox;
        self.tlbr(x1, y1, x2, y2)
            .label(raw.label)
            .confidence(raw.confidence)
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        let mut detection = Detection::from_rect(self.bbox, self.label, self.confidence);
        detection.color = self.palette.color(detection.class());
        if let Some((width, height)) = self.image_size {
            detection = detection.measured(width, height);
        }
        if let Some(rel_area) = self.rel_area {
            detection = detection.with_relative_area(rel_area);
        }
        detection
    }
}
