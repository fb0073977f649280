use std::path::Path;

use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::radiograph::Radiograph;

/// Writes a radiograph to an image file using the `image` crate.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, image: &Radiograph) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = image
            .to_rgb_image()
            .ok_or("Failed to create image from radiograph data")?;
        img.save(path)?;
        Ok(())
    }
}
