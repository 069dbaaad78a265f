use crate::domain::model::{
    BoxOrder, CardOutcome, Question, RegionSpec, RenderedCard, RunSummary,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use tiny_skia::Pixmap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paddings {
    pub category: i32,
    pub question: i32,
    pub interval: i32,
}

impl Default for Paddings {
    fn default() -> Self {
        Self {
            category: 3,
            question: 10,
            interval: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn input_delimiter(&self) -> u8;
    fn template_path(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn output_format(&self) -> OutputFormat;
    /// Pixel size every card is resized to, if any.
    fn card_size_px(&self) -> Option<(u32, u32)>;
    fn report_file(&self) -> Option<&str>;
    fn region_specs(&self) -> Vec<RegionSpec>;
    fn box_order(&self) -> BoxOrder;
    fn paddings(&self) -> Paddings;
    fn text_color(&self) -> [u8; 3];
    fn min_font_size(&self) -> u32;
}

/// Vertical extent of the reference glyphs at one font size, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphExtent {
    pub ascent: f32,
    pub descent: f32,
}

impl GlyphExtent {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Glyph metrics and rasterization at arbitrary pixel sizes.
pub trait Typeface: Send + Sync {
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    fn reference_extent(&self, font_size: f32) -> GlyphExtent;

    /// Draws one line whose line box starts at (`x`, `top`).
    fn draw_line(
        &self,
        canvas: &mut Pixmap,
        text: &str,
        x: f32,
        top: f32,
        font_size: f32,
        color: [u8; 3],
    );
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Question>>;
    async fn transform(&self, index: usize, question: &Question) -> Result<RenderedCard>;
    async fn load(&self, card: RenderedCard) -> Result<CardOutcome>;
    async fn finish(&self, summary: &RunSummary) -> Result<()>;
}
