//! Background synthesis.
//!
//! Produces the text-free background layer of an analyzed slide. External
//! text removal is tried tier by tier; when every tier fails the text boxes
//! are inpainted locally, and when even that fails the original image is
//! used as is. Synthesis never fails.

use std::sync::Arc;
use std::time::Duration;

use slide_core::{Geometry, ImageRef, SceneDocument};
use slide_renderer::inpaint_text_regions;

use crate::service::{with_timeout, QualityTier, ServiceError, TextRemovalService};

/// Instruction sent with every text-removal request.
pub const TEXT_REMOVAL_PROMPT: &str = "Based on this slide image, generate an exact copy with the following requirements:
1. Keep ALL icons, charts, decorative elements, and background exactly as they are
2. Remove ALL text content completely
3. Naturally fill the text areas with surrounding colors or textures
4. Ensure the result looks natural and professional, as if the text was never there
5. Maintain the exact same layout, colors, and style
6. Output size: 1920x1080 pixels

Generate a clean, text-free version of this presentation slide.";

/// Background synthesis configuration.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Tiers to try, in order.
    pub tiers: Vec<QualityTier>,
    /// Limit on a single text-removal request.
    pub timeout: Duration,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            tiers: QualityTier::ORDERED.to_vec(),
            timeout: Duration::from_secs(90),
        }
    }
}

/// How the background of a synthesized document was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// The document has no original image; nothing was done.
    NoOriginal,
    /// The slide has no text, so the original is the background.
    NoText,
    /// The text-removal service succeeded at this tier.
    Service(QualityTier),
    /// Every tier failed and the text was inpainted locally.
    Degraded {
        /// The last service failure.
        reason: String,
    },
    /// Local inpainting failed too; the original is the background.
    Original {
        /// Why local inpainting failed.
        reason: String,
    },
}

impl SynthesisOutcome {
    /// Whether the background is of lower quality than requested.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. } | Self::Original { .. })
    }
}

/// A synthesized document and how its background was made.
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// The document, with a background image unless it had no original.
    pub document: SceneDocument,
    /// How the background was produced.
    pub outcome: SynthesisOutcome,
}

/// Adds a text-free background image to analyzed documents.
#[derive(Clone)]
pub struct BackgroundSynthesizer {
    service: Arc<dyn TextRemovalService>,
    config: SynthesisConfig,
}

impl std::fmt::Debug for BackgroundSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundSynthesizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BackgroundSynthesizer {
    /// Create a synthesizer over `service`.
    #[must_use]
    pub fn new(service: Arc<dyn TextRemovalService>, config: SynthesisConfig) -> Self {
        Self { service, config }
    }

    /// Synthesize the background of `document`.
    ///
    /// Only the background image changes; the original image and all
    /// elements are kept.
    pub async fn synthesize(&self, document: SceneDocument) -> Synthesis {
        let Some(original) = document.original_image().cloned() else {
            tracing::debug!("No original image; skipping background synthesis");
            return Synthesis {
                document,
                outcome: SynthesisOutcome::NoOriginal,
            };
        };

        let regions: Vec<Geometry> = document.text_elements().map(|e| e.geometry).collect();
        if regions.is_empty() {
            tracing::info!("No text elements; using the original as background");
            return Synthesis {
                document: document.with_background_image(original),
                outcome: SynthesisOutcome::NoText,
            };
        }

        let reason = match self.remove_text(&original).await {
            Ok((tier, background)) => {
                tracing::info!("Background synthesized by text-removal service ({tier})");
                return Synthesis {
                    document: document.with_background_image(background),
                    outcome: SynthesisOutcome::Service(tier),
                };
            }
            Err(e) => e.to_string(),
        };

        tracing::warn!(
            "Text removal unavailable ({reason}); inpainting {} text regions locally",
            regions.len()
        );
        match inpaint_locally(original.clone(), regions).await {
            Ok(background) => Synthesis {
                document: document.with_background_image(background),
                outcome: SynthesisOutcome::Degraded { reason },
            },
            Err(local) => {
                tracing::warn!("Local inpainting failed ({local}); using the original as background");
                Synthesis {
                    document: document.with_background_image(original),
                    outcome: SynthesisOutcome::Original { reason: local },
                }
            }
        }
    }

    /// Try each configured tier in order, returning the first success.
    async fn remove_text(&self, original: &ImageRef) -> Result<(QualityTier, ImageRef), ServiceError> {
        let mut last = ServiceError::Unavailable("no quality tiers configured".to_string());
        for &tier in &self.config.tiers {
            tracing::debug!("Requesting text removal at tier {tier}");
            let result = with_timeout(
                self.config.timeout,
                self.service.remove_text(TEXT_REMOVAL_PROMPT, original, tier),
            )
            .await
            .and_then(|image| {
                if image.is_empty() {
                    Err(ServiceError::InvalidResponse("empty image".to_string()))
                } else {
                    Ok(image)
                }
            });
            match result {
                Ok(image) => return Ok((tier, image)),
                Err(e) => {
                    tracing::warn!("Text removal at tier {tier} failed: {e}");
                    last = e;
                }
            }
        }
        Err(last)
    }
}

/// Run the local inpainting routine off the async executor.
async fn inpaint_locally(original: ImageRef, regions: Vec<Geometry>) -> Result<ImageRef, String> {
    tokio::task::spawn_blocking(move || inpaint_text_regions(&original, &regions))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}
