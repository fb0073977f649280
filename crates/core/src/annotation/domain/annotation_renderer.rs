use crate::charting::annotation_instruction::AnnotationInstruction;
use crate::shared::radiograph::Radiograph;

/// Domain interface for drawing anomaly overlays onto a radiograph.
///
/// Implementations modify the image in place.
pub trait AnnotationRenderer: Send {
    fn render(
        &self,
        image: &mut Radiograph,
        instructions: &[AnnotationInstruction],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
