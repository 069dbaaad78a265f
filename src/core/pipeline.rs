use crate::adapters::{csv_source, raster};
use crate::core::intervals::IntervalEngine;
use crate::core::regions::RegionLocator;
use crate::core::text_fit::{FitError, TextFitter};
use crate::core::{
    CardField, CardOutcome, ConfigProvider, Pipeline, Question, RegionMap, RenderedCard,
    RunSummary, SkipReason, SkippedField, Storage, Typeface,
};
use crate::utils::error::{CardError, Result};
use image::RgbaImage;
use tiny_skia::Pixmap;

/// Reads the question file and builds one question per row. A missing or
/// unreadable file yields no questions.
pub async fn load_questions<S: Storage, C: ConfigProvider>(
    storage: &S,
    config: &C,
) -> Vec<Question> {
    csv_source::read_records(storage, config.input_path(), config.input_delimiter())
        .await
        .into_iter()
        .map(IntervalEngine::question)
        .collect()
}

/// Decodes the template and detects its placeholder regions. Any failure is
/// fatal for the run.
pub async fn load_template<S: Storage, C: ConfigProvider>(
    storage: &S,
    config: &C,
) -> Result<(RgbaImage, RegionMap)> {
    let path = config.template_path();
    let template_error = |message: String| CardError::TemplateLoadError {
        path: path.to_string(),
        message,
    };

    let bytes = storage
        .read_file(path)
        .await
        .map_err(|e| template_error(e.to_string()))?;
    let template = raster::decode_image(&bytes).map_err(|e| template_error(e.to_string()))?;
    tracing::info!(
        "🖼️ Template '{}' loaded ({}x{})",
        path,
        template.width(),
        template.height()
    );

    let regions = RegionLocator::new(config.box_order()).locate(&template, &config.region_specs());
    for (label, rects) in regions.iter() {
        if rects.is_empty() {
            tracing::warn!("No '{}' region found on the template", label);
        }
    }
    Ok((template, regions))
}

/// Renders questions onto a template. The template is decoded and scanned
/// once; every card draws on its own copy.
pub struct CardPipeline<S: Storage, C: ConfigProvider, F: Typeface> {
    storage: S,
    config: C,
    typeface: F,
    template: RgbaImage,
    regions: RegionMap,
    fitter: TextFitter,
}

impl<S: Storage, C: ConfigProvider, F: Typeface> CardPipeline<S, C, F> {
    pub async fn open(storage: S, config: C, typeface: F) -> Result<Self> {
        let (template, regions) = load_template(&storage, &config).await?;
        let fitter = TextFitter::new(config.min_font_size());
        Ok(Self {
            storage,
            config,
            typeface,
            template,
            regions,
            fitter,
        })
    }

    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    fn padding(&self, field: CardField) -> i32 {
        let paddings = self.config.paddings();
        match field {
            CardField::Category => paddings.category,
            CardField::Prompt => paddings.question,
            CardField::Interval(_) => paddings.interval,
        }
    }

    fn draw_field(
        &self,
        canvas: &mut Pixmap,
        field: CardField,
        text: &str,
    ) -> std::result::Result<(), SkipReason> {
        let (label, index) = field.slot();
        let rect = self
            .regions
            .get(label, index)
            .ok_or_else(|| SkipReason::MissingRegion {
                label: label.to_string(),
                index,
            })?;

        let layout = self
            .fitter
            .fit(&self.typeface, rect, self.padding(field), text)
            .map_err(|e| match e {
                FitError::PaddingExceedsBox { .. } => SkipReason::PaddingExceedsBox,
                FitError::NoFit { .. } => SkipReason::NoFit,
            })?;

        tracing::debug!(
            "Drawing {} at size {} in {} line(s)",
            field,
            layout.font_size,
            layout.lines.len()
        );
        let color = self.config.text_color();
        for line in &layout.lines {
            self.typeface.draw_line(
                canvas,
                &line.text,
                line.x as f32,
                line.y as f32,
                layout.font_size as f32,
                color,
            );
        }
        Ok(())
    }

    /// Draws every field of one card. Fields that cannot be drawn are skipped
    /// and reported; they never fail the card.
    pub fn render(&self, question: &Question) -> Result<(RgbaImage, Vec<SkippedField>)> {
        let mut canvas = raster::to_pixmap(&self.template)?;
        let mut skipped = Vec::new();

        for field in CardField::DRAW_ORDER {
            if let Err(reason) = self.draw_field(&mut canvas, field, field.text(question)) {
                skipped.push(SkippedField { field, reason });
            }
        }

        let mut image = raster::from_pixmap(&canvas)?;
        if let Some(size) = self.config.card_size_px() {
            image = raster::resize(&image, size);
        }
        Ok((image, skipped))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, F: Typeface> Pipeline for CardPipeline<S, C, F> {
    async fn extract(&self) -> Result<Vec<Question>> {
        Ok(load_questions(&self.storage, &self.config).await)
    }

    async fn transform(&self, index: usize, question: &Question) -> Result<RenderedCard> {
        let (image, skipped) = self.render(question)?;
        for skip in &skipped {
            tracing::warn!("⚠️ Card {}: skipped {} ({})", index, skip.field, skip.reason);
        }

        let format = self.config.output_format();
        let bytes = raster::encode_image(&image, format)?;
        Ok(RenderedCard {
            index,
            file_name: format!("{}.{}", index, format.extension()),
            bytes,
            question: question.clone(),
            skipped,
        })
    }

    async fn load(&self, card: RenderedCard) -> Result<CardOutcome> {
        let path = format!("{}/{}", self.config.output_dir(), card.file_name);
        tracing::debug!("Writing card {} ({} bytes) to {}", card.index, card.bytes.len(), path);
        self.storage.write_file(&path, &card.bytes).await?;

        let question = card.question;
        Ok(CardOutcome {
            index: card.index,
            path,
            category: question.category,
            prompt: question.prompt,
            correct_answer: question.correct_answer,
            intervals: question.intervals,
            skipped: card.skipped,
        })
    }

    async fn finish(&self, summary: &RunSummary) -> Result<()> {
        let Some(report) = self.config.report_file() else {
            return Ok(());
        };
        if summary.cards.is_empty() {
            tracing::info!("No cards rendered, skipping run report");
            return Ok(());
        }
        let path = format!("{}/{}", self.config.output_dir(), report);
        let json = serde_json::to_vec_pretty(summary)?;
        self.storage.write_file(&path, &json).await?;
        tracing::info!("📝 Run report written to {}", path);
        Ok(())
    }
}
