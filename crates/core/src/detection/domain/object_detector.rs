use crate::detection::domain::detections::RawDetection;
use crate::shared::radiograph::Radiograph;

/// Domain interface for a box detector (tooth or anomaly model).
///
/// Implementations are expected to be built once and reused across
/// radiographs; `&mut self` allows sessions with internal scratch state.
pub trait ObjectDetector: Send {
    fn detect(&mut self, image: &Radiograph)
        -> Result<Vec<RawDetection>, Box<dyn std::error::Error>>;
}
