use serde::Serialize;

use crate::shared::bounding_box::BoundingBox;

/// A box to outline on the radiograph, with its class color and label text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotationInstruction {
    pub bbox: BoundingBox,
    pub color: [u8; 3],
    pub label: String,
}
