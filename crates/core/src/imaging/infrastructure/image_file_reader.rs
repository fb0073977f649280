use std::path::Path;

use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::radiograph::Radiograph;

/// Reads image files with the `image` crate, converting any pixel format
/// (grayscale radiographs included) to RGB8.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Radiograph, Box<dyn std::error::Error>> {
        let img = image::open(path)
            .map_err(|e| format!("Failed to decode {}: {e}", path.display()))?
            .to_rgb8();
        log::debug!(
            "Decoded {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Ok(Radiograph::from_rgb_image(img))
    }
}
