use std::path::Path;

use crate::shared::radiograph::Radiograph;

/// Decodes a radiograph from storage.
pub trait ImageReader: Send {
    fn read(&self, path: &Path) -> Result<Radiograph, Box<dyn std::error::Error>>;
}
