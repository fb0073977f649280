use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::domain::detections::RawDetection;
use crate::detection::domain::object_detector::ObjectDetector;
use crate::shared::radiograph::Radiograph;

/// Detections produced ahead of time, e.g. by an external inference service.
///
/// File layout:
/// `{"teeth": [{"bbox": [x1, y1, x2, y2]}], "anomalies": [{"bbox": [...], "class_id": 4}]}`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonDetectionSource {
    #[serde(default)]
    pub teeth: Vec<RawDetection>,
    #[serde(default)]
    pub anomalies: Vec<RawDetection>,
}

impl JsonDetectionSource {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        let source: Self = serde_json::from_str(&json)?;
        log::info!(
            "Loaded {} tooth and {} anomaly detections from {}",
            source.teeth.len(),
            source.anomalies.len(),
            path.display()
        );
        Ok(source)
    }

    /// Splits the file into a tooth detector and an anomaly detector, both
    /// applying the same confidence threshold as the model detectors.
    pub fn into_detectors(self, confidence: f64) -> (PrecomputedDetector, PrecomputedDetector) {
        (
            PrecomputedDetector::new(self.teeth, confidence),
            PrecomputedDetector::new(self.anomalies, confidence),
        )
    }
}

/// Detector that ignores the pixels and returns a fixed detection list.
///
/// Entries scoring below `confidence` are skipped; entries without a score
/// count as fully confident.
pub struct PrecomputedDetector {
    detections: Vec<RawDetection>,
    confidence: f64,
}

impl PrecomputedDetector {
    pub fn new(detections: Vec<RawDetection>, confidence: f64) -> Self {
        Self {
            detections,
            confidence,
        }
    }
}

impl ObjectDetector for PrecomputedDetector {
    fn detect(
        &mut self,
        _image: &Radiograph,
    ) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
        Ok(self
            .detections
            .iter()
            .filter(|d| d.confidence >= self.confidence)
            .cloned()
            .collect())
    }
}
