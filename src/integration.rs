//! Integration module for connecting model backends with the scorer.
//!
//! This module provides traits for detection and classification backends
//! (Burn, ONNX Runtime, etc.) and a pipeline that turns their output into an
//! [`Assessment`].

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DamageClassifier, DetectionSource, NoClassifier, RawDetection, RoadClassifier};
pub use pipeline::{Assessment, AssessmentPipeline, Location, PipelineError};

#[cfg(feature = "burn-backend")]
mod burn_backend;

#[cfg(feature = "burn-backend")]
pub use burn_backend::{BurnDetector, BurnDetectorError, BurnModel, ModelOutput};
