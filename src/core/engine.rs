use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;

/// Drives a pipeline over all questions, strictly in input order. Each card
/// is persisted before the next one is rendered.
pub struct CardEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> CardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting card generation...");

        let questions = self.pipeline.extract().await?;
        tracing::info!("Extracted {} question(s)", questions.len());

        let mut summary = RunSummary::default();
        for (index, question) in questions.iter().enumerate() {
            let card = self.pipeline.transform(index, question).await?;
            let outcome = self.pipeline.load(card).await?;
            tracing::info!("🃏 Card {} saved to {}", index, outcome.path);
            summary.cards.push(outcome);
        }

        self.pipeline.finish(&summary).await?;
        tracing::info!(
            "Rendered {} card(s), {} field(s) skipped",
            summary.cards.len(),
            summary.skipped_field_count()
        );
        Ok(summary)
    }
}
