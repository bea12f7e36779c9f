mod detection;
mod labels;
mod merge;
mod palette;
mod rect;
mod severity;

pub use detection::{Detection, DetectionRecord};
pub(crate) use detection::round_to;
pub use labels::{DEFAULT_ROAD_THRESHOLD, LabelThresholds, RoadVerdict};
pub use merge::{DEFAULT_IOU_THRESHOLD, merge_boxes};
pub use palette::{BLUE, Color, DARK_BLUE, DamageClass, GREEN, ORANGE, PURPLE, Palette, RED};
pub use rect::{Rect, iou_batch};
pub use severity::{
    LevelThreshold, SeverityLevel, SeverityReport, SeverityThresholds, score_severity,
    score_severity_with,
};
