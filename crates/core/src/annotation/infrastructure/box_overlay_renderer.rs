use std::path::Path;

use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::annotation::domain::annotation_renderer::AnnotationRenderer;
use crate::charting::annotation_instruction::AnnotationInstruction;
use crate::shared::radiograph::Radiograph;

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Label tab size per character when no font is loaded.
const FALLBACK_CHAR_SIZE: (u32, u32) = (8, 12);

const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Outlines each anomaly box in its class color with a filled label tab
/// above the top-left corner.
///
/// Label text is drawn only when a font is available; otherwise the tab is
/// drawn empty so the box stays identifiable by color.
pub struct BoxOverlayRenderer {
    font: Option<FontVec>,
    font_scale: f32,
    thickness: u32,
}

impl BoxOverlayRenderer {
    pub fn new() -> Self {
        Self {
            font: None,
            font_scale: 24.0,
            thickness: 2,
        }
    }

    pub fn with_font_path(font_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let font_data = std::fs::read(font_path)?;
        let font = FontVec::try_from_vec(font_data)
            .map_err(|_| format!("Failed to parse font file: {}", font_path.display()))?;
        Ok(Self {
            font: Some(font),
            ..Self::new()
        })
    }

    /// Uses the first readable font from common system locations, or none.
    pub fn with_system_font() -> Self {
        for path in SYSTEM_FONT_PATHS {
            if let Ok(data) = std::fs::read(path) {
                if let Ok(font) = FontVec::try_from_vec(data) {
                    log::info!("Loaded label font: {path}");
                    return Self {
                        font: Some(font),
                        ..Self::new()
                    };
                }
            }
        }
        log::debug!("No system font found, labels will be drawn without text");
        Self::new()
    }

    fn draw_box(&self, img: &mut RgbImage, bbox: (i32, i32, u32, u32), color: Rgb<u8>) {
        let (left, top, width, height) = bbox;
        for t in 0..self.thickness {
            let (w, h) = (width.saturating_sub(2 * t), height.saturating_sub(2 * t));
            if w == 0 || h == 0 {
                break;
            }
            let inset = t as i32;
            draw_hollow_rect_mut(img, Rect::at(left + inset, top + inset).of_size(w, h), color);
        }
    }

    fn draw_label(&self, img: &mut RgbImage, left: i32, top: i32, label: &str, color: Rgb<u8>) {
        if label.is_empty() {
            return;
        }
        let (text_w, text_h) = match &self.font {
            Some(font) => text_size(self.font_scale, font, label),
            None => (
                FALLBACK_CHAR_SIZE.0 * label.chars().count() as u32,
                FALLBACK_CHAR_SIZE.1,
            ),
        };
        if text_w == 0 || text_h == 0 {
            return;
        }

        // Tab sits on the box's top edge, or inside the box at the image top
        let tab_top = (top - text_h as i32 - 2).max(0);
        draw_filled_rect_mut(img, Rect::at(left, tab_top).of_size(text_w, text_h + 2), color);
        if let Some(font) = &self.font {
            draw_text_mut(img, TEXT_COLOR, left, tab_top, self.font_scale, font, label);
        }
    }
}

impl Default for BoxOverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationRenderer for BoxOverlayRenderer {
    fn render(
        &self,
        image: &mut Radiograph,
        instructions: &[AnnotationInstruction],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if instructions.is_empty() {
            return Ok(());
        }
        let mut img = image
            .to_rgb_image()
            .ok_or("Radiograph buffer does not match its dimensions")?;

        for ins in instructions {
            let color = Rgb(ins.color);
            let left = ins.bbox.x1() as i32;
            let top = ins.bbox.y1() as i32;
            let width = (ins.bbox.width() as u32).max(1);
            let height = (ins.bbox.height() as u32).max(1);

            self.draw_box(&mut img, (left, top, width, height), color);
            self.draw_label(&mut img, left, top, &ins.label, color);
        }

        *image = Radiograph::from_rgb_image(img);
        Ok(())
    }
}
