//! The import pipeline: analysis, then background synthesis.

use std::sync::Arc;

use slide_core::{CancellationToken, ImageRef};
use thiserror::Error;

use crate::analysis::{AnalysisAdapter, AnalysisConfig, AnalysisError};
use crate::service::{TextRemovalService, VisionService};
use crate::synthesis::{BackgroundSynthesizer, Synthesis, SynthesisConfig};

/// Errors that stop an import.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The slide could not be analyzed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The import was superseded; its result was discarded.
    #[error("import cancelled")]
    Cancelled,
}

/// Turns a slide image into an editable document with a synthesized
/// background.
#[derive(Debug, Clone)]
pub struct SlidePipeline {
    analysis: AnalysisAdapter,
    synthesis: BackgroundSynthesizer,
}

impl SlidePipeline {
    /// Create a pipeline with default configuration.
    #[must_use]
    pub fn new(
        vision: Arc<dyn VisionService>,
        text_removal: Arc<dyn TextRemovalService>,
    ) -> Self {
        Self::with_config(
            vision,
            text_removal,
            AnalysisConfig::default(),
            SynthesisConfig::default(),
        )
    }

    /// Create a pipeline with explicit configuration.
    #[must_use]
    pub fn with_config(
        vision: Arc<dyn VisionService>,
        text_removal: Arc<dyn TextRemovalService>,
        analysis: AnalysisConfig,
        synthesis: SynthesisConfig,
    ) -> Self {
        Self {
            analysis: AnalysisAdapter::new(vision, analysis),
            synthesis: BackgroundSynthesizer::new(text_removal, synthesis),
        }
    }

    /// Import `image` on behalf of the holder of `token`.
    ///
    /// The token is checked after every external call. A cancelled import
    /// never yields a document, even if the calls succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Analysis`] if analysis fails and
    /// [`PipelineError::Cancelled`] if the token was cancelled.
    pub async fn import(
        &self,
        image: &ImageRef,
        token: &CancellationToken,
    ) -> Result<Synthesis, PipelineError> {
        if token.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let document = self.analysis.analyze(image).await?;
        let document = token.accept(document).ok_or_else(|| {
            tracing::info!("Discarding analysis result of a cancelled import");
            PipelineError::Cancelled
        })?;

        let synthesis = self.synthesis.synthesize(document).await;
        let synthesis = token.accept(synthesis).ok_or_else(|| {
            tracing::info!("Discarding background of a cancelled import");
            PipelineError::Cancelled
        })?;

        tracing::info!(
            "Imported slide {} with {} elements ({:?})",
            synthesis.document.id(),
            synthesis.document.element_count(),
            synthesis.outcome
        );
        Ok(synthesis)
    }
}
