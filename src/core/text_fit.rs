use crate::core::{LayoutLine, Rect, TextLayout, Typeface};
use thiserror::Error;

/// Font sizes at or below this are never tried.
pub const FONT_SIZE_FLOOR: u32 = 5;

/// Glyphs with both a tall ascender and a descender, measured once per size
/// so every line of a block gets the same height.
pub const REFERENCE_GLYPHS: &str = "Agy";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FitError {
    #[error("padding {padding} leaves no room inside a {width}x{height} box")]
    PaddingExceedsBox { padding: i32, width: i32, height: i32 },

    #[error("text does not fit at any font size above {floor}")]
    NoFit { floor: u32 },
}

/// Finds the largest font size at which word-wrapped text fits a box.
#[derive(Debug, Clone, Copy)]
pub struct TextFitter {
    floor: u32,
}

impl Default for TextFitter {
    fn default() -> Self {
        Self {
            floor: FONT_SIZE_FLOOR,
        }
    }
}

impl TextFitter {
    pub fn new(floor: u32) -> Self {
        Self { floor }
    }

    pub fn fit<F: Typeface + ?Sized>(
        &self,
        face: &F,
        rect: Rect,
        padding: i32,
        text: &str,
    ) -> Result<TextLayout, FitError> {
        let inner_width = rect.width - 2 * padding;
        let inner_height = rect.height - 2 * padding;
        if inner_width <= 0 || inner_height <= 0 {
            return Err(FitError::PaddingExceedsBox {
                padding,
                width: rect.width,
                height: rect.height,
            });
        }

        let max_width = inner_width as f32;
        let mut font_size = inner_height as u32;
        while font_size > self.floor {
            let size = font_size as f32;
            let line_height = (face.reference_extent(size).height().ceil() as i32).max(1);
            let lines = wrap_words(face, text, size, max_width);

            let overflows = lines
                .iter()
                .any(|line| face.text_width(line, size) > max_width);
            let total_height = lines.len() as i32 * line_height;
            if !overflows && total_height <= inner_height {
                let top = rect.y + padding + (inner_height - total_height) / 2;
                let lines = lines
                    .into_iter()
                    .enumerate()
                    .map(|(i, line)| {
                        let slack = max_width - face.text_width(&line, size);
                        LayoutLine {
                            x: rect.x + padding + (slack / 2.0).round() as i32,
                            y: top + i as i32 * line_height,
                            text: line,
                        }
                    })
                    .collect();
                return Ok(TextLayout {
                    font_size,
                    line_height,
                    lines,
                });
            }
            font_size -= 1;
        }

        Err(FitError::NoFit { floor: self.floor })
    }
}

/// Greedy wrap on single spaces. The last line is always emitted, so empty
/// text yields one empty line.
fn wrap_words<F: Typeface + ?Sized>(
    face: &F,
    text: &str,
    size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let candidate = format!("{} {}", current, word).trim().to_string();
        if face.text_width(&candidate, size) <= max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(current);
            }
            current = word.to_string();
        }
    }
    lines.push(current);
    lines
}
