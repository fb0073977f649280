use serde::{Deserialize, Serialize};

use crate::shared::bounding_box::BoundingBox;

/// Detector output before ingestion: coordinates are unvalidated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// `[x1, y1, x2, y2]` in radiograph pixels.
    pub bbox: [f64; 4],
    #[serde(default)]
    pub class_id: usize,
    #[serde(default = "full_confidence")]
    pub confidence: f64,
}

fn full_confidence() -> f64 {
    1.0
}

/// A located tooth. The tooth model has a single class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToothDetection {
    pub bbox: BoundingBox,
}

/// A located anomaly with its detector class id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnomalyDetection {
    pub bbox: BoundingBox,
    pub class_id: usize,
}

/// Converts raw tooth detections, dropping degenerate boxes.
pub fn ingest_teeth(raw: &[RawDetection]) -> Vec<ToothDetection> {
    raw.iter()
        .filter_map(|d| pixel_box(d, "tooth"))
        .map(|bbox| ToothDetection { bbox })
        .collect()
}

/// Converts raw anomaly detections, dropping degenerate boxes.
///
/// Class ids are kept as-is; the engine checks them against the catalog.
pub fn ingest_anomalies(raw: &[RawDetection]) -> Vec<AnomalyDetection> {
    raw.iter()
        .filter_map(|d| {
            pixel_box(d, "anomaly").map(|bbox| AnomalyDetection {
                bbox,
                class_id: d.class_id,
            })
        })
        .collect()
}

/// Truncates coordinates to whole pixels and validates the result.
fn pixel_box(d: &RawDetection, kind: &str) -> Option<BoundingBox> {
    let [x1, y1, x2, y2] = d.bbox.map(f64::trunc);
    match BoundingBox::new(x1, y1, x2, y2) {
        Ok(bbox) => Some(bbox),
        Err(e) => {
            log::warn!("Dropping {kind} detection: {e}");
            None
        }
    }
}
