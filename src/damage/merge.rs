//! Same-class box merging.

use crate::damage::detection::Detection;
use crate::damage::rect::{Rect, iou_batch};

/// IoU at or above which two same-class boxes are treated as one defect.
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.5;

/// Collapse overlapping detections of the same class.
///
/// Detections are visited in input order. Each unused detection anchors a
/// group holding every later unused detection with the same label and
/// `IoU(anchor, other) >= iou_threshold`. A group becomes one detection with
/// the union box and the highest confidence; label and color come from the
/// anchor.
///
/// This is a single pass: merged boxes are not compared again, so the result
/// depends on input order and merging twice may merge further.
pub fn merge_boxes(detections: &[Detection], iou_threshold: f32) -> Vec<Detection> {
    if detections.is_empty() {
        return Vec::new();
    }

    let rects: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
    let ious = iou_batch(&rects, &rects);

    let mut used = vec![false; detections.len()];
    let mut merged = Vec::new();

    for i in 0..detections.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let anchor = &detections[i];

        let mut group = vec![i];
        for j in (i + 1)..detections.len() {
            if used[j] || detections[j].label != anchor.label {
                continue;
            }
            if ious[[i, j]] >= iou_threshold {
                group.push(j);
                used[j] = true;
            }
        }

        if group.len() == 1 {
            merged.push(anchor.clone());
            continue;
        }

        let bbox = group
            .iter()
            .skip(1)
            .fold(anchor.bbox, |acc, &k| acc.union(&detections[k].bbox));
        let confidence = group
            .iter()
            .map(|&k| detections[k].confidence)
            .fold(f32::NEG_INFINITY, f32::max);

        let mut combined = anchor.with_bbox(bbox);
        combined.confidence = confidence;
        merged.push(combined);
    }

    tracing::debug!(
        input = detections.len(),
        output = merged.len(),
        iou_threshold,
        "merged same-class boxes"
    );
    merged
}
