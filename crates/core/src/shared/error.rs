use thiserror::Error;

pub type Result<T> = std::result::Result<T, DentalError>;

/// Failures raised by the charting engine and its configuration.
///
/// Empty detection sets are not errors; they produce an empty report.
#[derive(Error, Debug)]
pub enum DentalError {
    #[error("invalid box ({x1}, {y1}, {x2}, {y2}): width and height must be positive")]
    InvalidBox { x1: f64, y1: f64, x2: f64, y2: f64 },

    #[error("unknown anomaly class id {class_id} (catalog has {known} classes)")]
    UnknownClassId { class_id: usize, known: usize },

    #[error("invalid anomaly catalog: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
