//! Post-processing for road damage detection.
//!
//! Detector output is turned into [`Detection`]s, optionally collapsed with
//! [`merge_boxes`], and summarized by [`score_severity`]. The models
//! themselves are injected through the traits in [`integration`].

pub mod config;
pub mod damage;
pub mod error;
pub mod integration;

pub use config::AssessConfig;
pub use damage::{
    DEFAULT_IOU_THRESHOLD, DamageClass, Detection, DetectionRecord, LabelThresholds, Palette,
    Rect, RoadVerdict, SeverityLevel, SeverityReport, SeverityThresholds, merge_boxes,
    score_severity, score_severity_with,
};
pub use error::{Error, Result};
pub use integration::{
    Assessment, AssessmentPipeline, DamageClassifier, DetectionBuilder, DetectionSource, Location,
    PipelineError, RawDetection, RoadClassifier,
};
