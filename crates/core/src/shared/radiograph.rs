use image::RgbImage;
use ndarray::ArrayView3;

/// A decoded radiograph: contiguous RGB8 bytes in row-major order.
///
/// Detector and annotation adapters work on this buffer; the charting engine
/// only ever sees boxes.
#[derive(Clone, Debug)]
pub struct Radiograph {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Radiograph {
    pub const CHANNELS: u8 = 3;

    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * Self::CHANNELS as usize,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn from_rgb_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height)
    }

    /// Copies the pixels into an `image` buffer for drawing or encoding.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `[height, width, channel]` view, or `None` if the buffer is inconsistent.
    pub fn as_ndarray(&self) -> Option<ArrayView3<'_, u8>> {
        ArrayView3::from_shape(
            (
                self.height as usize,
                self.width as usize,
                Self::CHANNELS as usize,
            ),
            &self.data,
        )
        .ok()
    }
}
