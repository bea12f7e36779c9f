//! Traits for the model backends the assessment depends on.

use crate::damage::RoadVerdict;

/// Detector output for one box, after the backend's own NMS.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Bounding box in TLBR format (x1, y1, x2, y2), in image pixels
    pub bbox: [f32; 4],
    /// Class label
    pub label: String,
    /// Confidence score
    pub confidence: f32,
}

impl RawDetection {
    pub fn new(bbox: [f32; 4], label: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            label: label.into(),
            confidence,
        }
    }
}

/// Trait for road damage detection backends.
///
/// # Example
///
/// ```ignore
/// use road_severity::{DetectionSource, RawDetection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<RawDetection>, Self::Error> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawDetection>, Self::Error>;
}

/// Multi-label damage classifier.
pub trait DamageClassifier {
    type Error;

    /// Per-class scores in [0, 1], ordered as [`crate::DamageClass::ALL`].
    fn scores(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<f32>, Self::Error>;
}

/// Binary classifier deciding whether an image shows a road at all.
pub trait RoadClassifier {
    type Error;

    /// Confidence in [0, 1] that the image shows a road.
    fn confidence(&mut self, input: &[u8], width: u32, height: u32) -> Result<f32, Self::Error>;

    fn verdict(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        threshold: f32,
    ) -> Result<RoadVerdict, Self::Error> {
        let confidence = self.confidence(input, width, height)?;
        let verdict = RoadVerdict::from_confidence(confidence, threshold);
        tracing::debug!(confidence, threshold, %verdict, "road classifier");
        Ok(verdict)
    }
}

/// Placeholder for pipelines that run without a damage classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClassifier;

impl DamageClassifier for NoClassifier {
    type Error = std::convert::Infallible;

    fn scores(&mut self, _input: &[u8], _width: u32, _height: u32) -> Result<Vec<f32>, Self::Error> {
        Ok(Vec::new())
    }
}
