/// Number of tooth slots in a report (permanent dentition).
pub const TOOTH_SLOTS: u8 = 32;

/// An anomaly is attributed to a tooth when their IoU is strictly above this.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.05;

/// Upper bound on two-means refinement rounds when splitting the arches.
pub const ARCH_SPLIT_MAX_ITERATIONS: usize = 100;

/// Default detector confidence threshold.
pub const DEFAULT_CONFIDENCE: f64 = 0.25;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const SETTINGS_DIR_NAME: &str = "DentaScan";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
