use crate::core::text_fit::REFERENCE_GLYPHS;
use crate::core::{GlyphExtent, Typeface};
use crate::utils::error::{CardError, Result};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Transform};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// A TrueType/OpenType face held as raw bytes. Metrics and outlines are read
/// with `ttf-parser`, glyphs are filled with `tiny-skia`.
pub struct TrueTypeFont {
    name: String,
    data: Vec<u8>,
}

impl TrueTypeFont {
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let name = name.into();
        if let Err(e) = Face::parse(&data, 0) {
            return Err(CardError::FontError {
                message: format!("'{}' is not a usable font: {}", name, e),
            });
        }
        Ok(Self { name, data })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }
}

fn scale_for(face: &Face<'_>, font_size: f32) -> f32 {
    font_size / face.units_per_em().max(1) as f32
}

fn advance(face: &Face<'_>, ch: char, font_size: f32) -> f32 {
    face.glyph_index(ch)
        .and_then(|gid| face.glyph_hor_advance(gid))
        .map(|adv| adv as f32 * scale_for(face, font_size))
        // missing glyphs still take up room so centring stays stable
        .unwrap_or(font_size * 0.5)
}

impl Typeface for TrueTypeFont {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        text.chars().map(|ch| advance(&face, ch, font_size)).sum()
    }

    fn reference_extent(&self, font_size: f32) -> GlyphExtent {
        let Some(face) = self.face() else {
            return GlyphExtent {
                ascent: font_size,
                descent: 0.0,
            };
        };
        let scale = scale_for(&face, font_size);

        let boxes: Vec<_> = REFERENCE_GLYPHS
            .chars()
            .filter_map(|ch| face.glyph_index(ch))
            .filter_map(|gid| face.glyph_bounding_box(gid))
            .collect();
        if boxes.is_empty() {
            return GlyphExtent {
                ascent: face.ascender() as f32 * scale,
                descent: -(face.descender() as f32) * scale,
            };
        }

        let top = boxes.iter().map(|b| b.y_max).max().unwrap_or(0);
        let bottom = boxes.iter().map(|b| b.y_min).min().unwrap_or(0);
        GlyphExtent {
            ascent: top as f32 * scale,
            descent: -(bottom as f32) * scale,
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
        let Some(face) = self.face() else {
            return;
        };
        let scale = scale_for(&face, font_size);
        let baseline = top + self.reference_extent(font_size).ascent;

        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], 255);
        paint.anti_alias = true;

        let mut pen_x = x;
        for ch in text.chars() {
            if let Some(gid) = face.glyph_index(ch) {
                if let Some(path) = glyph_path(&face, gid, pen_x, baseline, scale) {
                    canvas.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            pen_x += advance(&face, ch, font_size);
        }
    }
}

fn glyph_path(face: &Face<'_>, gid: GlyphId, x: f32, baseline: f32, scale: f32) -> Option<Path> {
    let mut builder = GlyphPathBuilder::new(x, baseline, scale);
    face.outline_glyph(gid, &mut builder)?;
    builder.finish()
}

/// Converts font units (y up) into canvas pixels (y down) around a pen position.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (px, py) = self.point(x, y);
        self.builder.move_to(px, py);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (px, py) = self.point(x, y);
        self.builder.line_to(px, py);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c1x, c1y) = self.point(x1, y1);
        let (px, py) = self.point(x, y);
        self.builder.quad_to(c1x, c1y, px, py);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1x, c1y) = self.point(x1, y1);
        let (c2x, c2y) = self.point(x2, y2);
        let (px, py) = self.point(x, y);
        self.builder.cubic_to(c1x, c1y, c2x, c2y, px, py);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
