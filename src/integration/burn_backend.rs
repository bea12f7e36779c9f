//! Burn inference backend for road damage detection.
//!
//! # Example
//!
//! ```ignore
//! use road_severity::integration::{BurnDetector, BurnModel, ModelOutput};
//! use burn::backend::NdArray;
//!
//! struct RoadDamageYolo { /* ... */ }
//!
//! impl BurnModel<NdArray> for RoadDamageYolo {
//!     fn forward(&self, input: burn::tensor::Tensor<NdArray, 4>) -> Vec<ModelOutput> {
//!         // Run inference and NMS
//!     }
//! }
//!
//! let detector = BurnDetector::new(model, device, ["pothole", "alligator crack"]);
//! ```

use burn::prelude::*;
use burn::tensor::Tensor;

use super::{DetectionSource, RawDetection};
use crate::damage::Rect;

/// Error type for Burn detection failures.
#[derive(Debug, Clone)]
pub enum BurnDetectorError {
    /// Input buffer does not hold `channels * height * width` bytes.
    InvalidInputDimensions {
        expected: (u32, u32, u32),
        got: usize,
    },
    /// Input size differs from the model's input size.
    PreprocessingError(String),
}

impl std::fmt::Display for BurnDetectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInputDimensions { expected, got } => {
                let (channels, height, width) = *expected;
                match input_byte_len(channels, height, width) {
                    Some(len) => write!(
                        f,
                        "Invalid input dimensions: expected {:?} ({} bytes), got {} bytes",
                        expected, len, got
                    ),
                    None => write!(
                        f,
                        "Invalid input dimensions: {:?} overflows the address space, got {} bytes",
                        expected, got
                    ),
                }
            }
            Self::PreprocessingError(msg) => write!(f, "Preprocessing error: {}", msg),
        }
    }
}

impl std::error::Error for BurnDetectorError {}

/// Bytes in a `channels x height x width` u8 image, or `None` if that does not fit in `usize`.
fn input_byte_len(channels: u32, height: u32, width: u32) -> Option<usize> {
    (channels as usize)
        .checked_mul(height as usize)?
        .checked_mul(width as usize)
}

/// One box as emitted by the model, after NMS.
#[derive(Debug, Clone)]
pub struct ModelOutput {
    /// Bounding box: [x1, y1, x2, y2] or [cx, cy, w, h] depending on model
    pub bbox: [f32; 4],
    /// Confidence score
    pub score: f32,
    /// Index into the detector's class names
    pub class_id: usize,
}

/// Trait for Burn-based detection models.
pub trait BurnModel<B: Backend>: Send + Sync {
    /// Run forward pass on a [1, channels, height, width] tensor.
    fn forward(&self, input: Tensor<B, 4>) -> Vec<ModelOutput>;

    /// Get the expected input size (channels, height, width).
    fn input_size(&self) -> (u32, u32, u32) {
        (3, 640, 640)
    }

    /// Whether bbox output is in XYWH format (vs TLBR).
    fn bbox_is_xywh(&self) -> bool {
        true
    }
}

/// Burn-based damage detector implementing `DetectionSource`.
pub struct BurnDetector<B: Backend, M: BurnModel<B>> {
    model: M,
    device: B::Device,
    class_names: Vec<String>,
    conf_threshold: f32,
}

impl<B: Backend, M: BurnModel<B>> BurnDetector<B, M> {
    /// Create a detector; `class_names[i]` labels class id `i`.
    pub fn new<S: Into<String>>(
        model: M,
        device: B::Device,
        class_names: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            model,
            device,
            class_names: class_names.into_iter().map(Into::into).collect(),
            conf_threshold: 0.5,
        }
    }

    /// Set the confidence threshold for filtering detections.
    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    /// Convert planar RGB bytes to a normalized [1, C, H, W] tensor.
    pub fn preprocess(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Tensor<B, 4>, BurnDetectorError> {
        let (channels, target_h, target_w) = self.model.input_size();
        if input_byte_len(channels, height, width) != Some(input.len()) {
            return Err(BurnDetectorError::InvalidInputDimensions {
                expected: (channels, height, width),
                got: input.len(),
            });
        }

        if height != target_h || width != target_w {
            return Err(BurnDetectorError::PreprocessingError(format!(
                "Input size {}x{} doesn't match model size {}x{}",
                width, height, target_w, target_h
            )));
        }

        let data: Vec<f32> = input.iter().map(|&x| x as f32 / 255.0).collect();
        let tensor = Tensor::<B, 1>::from_floats(data.as_slice(), &self.device).reshape([
            1,
            channels as usize,
            height as usize,
            width as usize,
        ]);

        Ok(tensor)
    }

    fn label(&self, class_id: usize) -> String {
        self.class_names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", class_id))
    }

    fn postprocess(&self, outputs: Vec<ModelOutput>) -> Vec<RawDetection> {
        outputs
            .into_iter()
            .filter(|o| o.score >= self.conf_threshold)
            .map(|o| {
                let [a, b, c, d] = o.bbox;
                let bbox = if self.model.bbox_is_xywh() {
                    Rect::from_center(a, b, c, d).to_tlbr()
                } else {
                    o.bbox
                };
                RawDetection::new(bbox, self.label(o.class_id), o.score)
            })
            .collect()
    }
}

impl<B: Backend, M: BurnModel<B>> DetectionSource for BurnDetector<B, M> {
    type Error = BurnDetectorError;

    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawDetection>, Self::Error> {
        let tensor = self.preprocess(input, width, height)?;
        let outputs = self.model.forward(tensor);
        Ok(self.postprocess(outputs))
    }
}
