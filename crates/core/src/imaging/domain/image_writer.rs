use std::path::Path;

use crate::shared::radiograph::Radiograph;

/// Encodes a radiograph to storage; the format follows the path extension.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, image: &Radiograph) -> Result<(), Box<dyn std::error::Error>>;
}
