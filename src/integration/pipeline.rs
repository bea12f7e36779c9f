//! AssessmentPipeline for combining detection with severity scoring.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::AssessConfig;
use crate::damage::{
    DamageClass, Detection, SeverityReport, merge_boxes, round_to, score_severity_with,
};
use crate::error::Error;

use super::{DamageClassifier, DetectionBuilder, DetectionSource, NoClassifier};

/// Where an image was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything known about one assessed image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub detections: Vec<Detection>,
    pub severity: SeverityReport,
    /// Damage classes predicted by the multi-label classifier, if one ran
    #[serde(rename = "vit_predictions")]
    pub labels: Vec<DamageClass>,
    pub image_dimensions: [u32; 2],
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Seconds spent in detection, scoring and classification
    pub processing_time: f32,
}

impl Assessment {
    /// Filter, optionally merge and score already built detections.
    ///
    /// Used directly when detections come from somewhere other than a
    /// [`DetectionSource`], e.g. a JSON file.
    pub fn from_detections(
        detections: Vec<Detection>,
        width: u32,
        height: u32,
        location: Option<Location>,
        config: &AssessConfig,
    ) -> Self {
        let mut detections: Vec<Detection> = detections
            .into_iter()
            .filter(|d| d.confidence >= config.min_confidence)
            .collect();
        if config.merge.enabled {
            detections = merge_boxes(&detections, config.merge.iou_threshold);
        }
        let severity = score_severity_with(&detections, &config.severity);

        Self {
            detections,
            severity,
            labels: Vec::new(),
            image_dimensions: [width, height],
            latitude: location.map(|l| l.latitude),
            longitude: location.map(|l| l.longitude),
            processing_time: 0.0,
        }
    }

    /// Record the time spent producing this assessment, in seconds to two decimals.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.processing_time = round_to(elapsed.as_secs_f32(), 2);
        self
    }
}

/// Failure of one assessment.
#[derive(Debug)]
pub enum PipelineError<DE, CE> {
    /// The detector backend failed.
    Detector(DE),
    /// The damage classifier backend failed.
    Classifier(CE),
    /// Input or classifier output was unusable.
    Assess(Error),
}

impl<DE: std::fmt::Display, CE: std::fmt::Display> std::fmt::Display for PipelineError<DE, CE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detector(e) => write!(f, "Detector error: {}", e),
            Self::Classifier(e) => write!(f, "Classifier error: {}", e),
            Self::Assess(e) => write!(f, "Assessment error: {}", e),
        }
    }
}

impl<DE, CE> std::error::Error for PipelineError<DE, CE>
where
    DE: std::fmt::Debug + std::fmt::Display,
    CE: std::fmt::Debug + std::fmt::Display,
{
}

impl<DE, CE> From<Error> for PipelineError<DE, CE> {
    fn from(e: Error) -> Self {
        Self::Assess(e)
    }
}

/// Runs a detector, and optionally a damage classifier, over one image and
/// scores the result.
///
/// The pipeline owns its backends; run one pipeline per worker for parallel
/// assessment.
pub struct AssessmentPipeline<D: DetectionSource, C: DamageClassifier = NoClassifier> {
    detector: D,
    classifier: Option<C>,
    config: AssessConfig,
}

impl<D: DetectionSource> AssessmentPipeline<D> {
    /// Create a detector-only pipeline.
    pub fn new(detector: D, config: AssessConfig) -> Self {
        Self {
            detector,
            classifier: None,
            config,
        }
    }

    /// Create a detector-only pipeline with default configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, AssessConfig::default())
    }
}

impl<D: DetectionSource, C: DamageClassifier> AssessmentPipeline<D, C> {
    /// Attach a multi-label damage classifier.
    pub fn with_classifier<C2: DamageClassifier>(self, classifier: C2) -> AssessmentPipeline<D, C2> {
        AssessmentPipeline {
            detector: self.detector,
            classifier: Some(classifier),
            config: self.config,
        }
    }

    /// Assess a single image.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes, passed through to the backends
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `location` - Where the image was taken, if known
    pub fn assess(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        location: Option<Location>,
    ) -> Result<Assessment, PipelineError<D::Error, C::Error>> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImageSize { width, height }.into());
        }
        let start = Instant::now();

        let raw = self
            .detector
            .detect(input, width, height)
            .map_err(PipelineError::Detector)?;
        tracing::debug!(raw = raw.len(), elapsed = ?start.elapsed(), "detector finished");

        let detections = raw
            .into_iter()
            .map(|r| {
                DetectionBuilder::new()
                    .raw(r)
                    .palette(self.config.palette)
                    .image_size(width, height)
                    .build()
            })
            .collect();
        let mut assessment =
            Assessment::from_detections(detections, width, height, location, &self.config);

        if let Some(classifier) = self.classifier.as_mut() {
            let classify_start = Instant::now();
            let scores = classifier
                .scores(input, width, height)
                .map_err(PipelineError::Classifier)?;
            assessment.labels = self.config.labels.predict_labels(&scores)?;
            tracing::debug!(
                labels = ?assessment.labels,
                elapsed = ?classify_start.elapsed(),
                "classifier finished"
            );
        }

        let assessment = assessment.with_elapsed(start.elapsed());
        tracing::info!(
            level = %assessment.severity.level,
            count = assessment.severity.count_score,
            area = assessment.severity.area_score,
            types = assessment.severity.type_score,
            elapsed = ?start.elapsed(),
            "assessed image"
        );
        Ok(assessment)
    }

    pub fn config(&self) -> &AssessConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AssessConfig {
        &mut self.config
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }
}
