#![allow(dead_code)]

use guesstimate_cards::core::{GlyphExtent, Rect, Typeface};
use guesstimate_cards::CardConfig;
use image::{ImageFormat, Rgba, RgbaImage};
use std::path::Path;
use tiny_skia::{Paint, Pixmap};

/// Every non-space character is a solid block half an em wide.
pub struct BlockFace;

impl Typeface for BlockFace {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.5
    }

    fn reference_extent(&self, font_size: f32) -> GlyphExtent {
        GlyphExtent {
            ascent: font_size * 0.75,
            descent: font_size * 0.25,
        }
    }

    fn draw_line(
        &self,
        canvas: &mut Pixmap,
        text: &str,
        x: f32,
        top: f32,
        font_size: f32,
        color: [u8; 3],
    ) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], 255);
        let advance = font_size * 0.5;
        for (i, ch) in text.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let left = x + i as f32 * advance;
            if let Some(rect) = tiny_skia::Rect::from_xywh(left, top, advance - 1.0, font_size) {
                canvas.fill_rect(rect, &paint, tiny_skia::Transform::identity(), None);
            }
        }
    }
}

pub const WHITE: [u8; 3] = [255, 255, 255];

/// Placeholder boxes of the synthetic template, coloured inside the stock ranges.
pub const TEMPLATE_BOXES: [([u8; 3], Rect); 10] = [
    ([155, 175, 190], Rect { x: 10, y: 10, width: 120, height: 20 }),
    ([90, 175, 190], Rect { x: 10, y: 40, width: 280, height: 50 }),
    ([240, 130, 115], Rect { x: 10, y: 100, width: 45, height: 20 }),
    ([248, 195, 140], Rect { x: 60, y: 100, width: 45, height: 20 }),
    ([248, 240, 155], Rect { x: 110, y: 100, width: 35, height: 20 }),
    ([248, 240, 155], Rect { x: 155, y: 100, width: 35, height: 20 }),
    ([248, 195, 140], Rect { x: 195, y: 100, width: 45, height: 20 }),
    ([240, 130, 115], Rect { x: 245, y: 100, width: 45, height: 20 }),
    ([165, 230, 145], Rect { x: 110, y: 140, width: 80, height: 40 }),
    // outside every configured range
    ([20, 20, 20], Rect { x: 10, y: 140, width: 60, height: 40 }),
];

pub fn template_image() -> RgbaImage {
    let mut image = RgbaImage::from_pixel(300, 200, Rgba([WHITE[0], WHITE[1], WHITE[2], 255]));
    for (color, rect) in TEMPLATE_BOXES {
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                image.put_pixel(x as u32, y as u32, Rgba([color[0], color[1], color[2], 255]));
            }
        }
    }
    image
}

pub fn write_template(dir: &Path, name: &str) {
    template_image()
        .save_with_format(dir.join(name), ImageFormat::Png)
        .unwrap();
}

pub const QUESTIONS_CSV: &str = "\
Category,Prompt,LowerBound2,LowerBound3,LowerBound4,LowerBound6,CorrectAnswer,UpperBound6,UpperBound4,UpperBound3,UpperBound2
Geografi,How long is the Swedish coastline in km,2000,2300,2600,2800,2850,2900,3100,3400,3700
Historia,In which year was the printing press invented,1400,1420,1430,1436,1440,1445,1450,1460,1480
";

pub fn write_questions(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

/// Config whose relative paths point into a scratch directory.
pub fn test_config() -> CardConfig {
    let mut config = CardConfig::default();
    config.input.path = "questions.csv".to_string();
    config.template.path = "template.png".to_string();
    config.output.dir = "cards".to_string();
    config.font.path = "block.ttf".to_string();
    config
}
