//! External service contracts.
//!
//! The vision model and the generative text-removal model are consumed
//! through these traits. Transport (HTTP, recorded fixtures, mocks) is the
//! implementor's concern.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use slide_core::ImageRef;
use thiserror::Error;

/// Failure of an external collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The service could not be reached or refused the request.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with something unusable.
    #[error("invalid service response: {0}")]
    InvalidResponse(String),

    /// The service did not answer in time.
    #[error("service timed out after {0:?}")]
    Timeout(Duration),
}

/// Quality tier of a text-removal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    /// Slower, higher-fidelity model.
    HighFidelity,
    /// Faster, cheaper model.
    Fast,
}

impl QualityTier {
    /// Tiers in the order they are attempted.
    pub const ORDERED: [Self; 2] = [Self::HighFidelity, Self::Fast];

    /// Stable name of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighFidelity => "high_fidelity",
            Self::Fast => "fast",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vision model that describes an image as text.
#[async_trait]
pub trait VisionService: Send + Sync {
    /// Send `prompt` and `image`, returning the raw text answer.
    async fn analyze_image(&self, prompt: &str, image: &ImageRef) -> Result<String, ServiceError>;
}

/// A generative image model that removes text from a slide.
#[async_trait]
pub trait TextRemovalService: Send + Sync {
    /// Return a text-free version of `image` at the requested tier.
    async fn remove_text(
        &self,
        prompt: &str,
        image: &ImageRef,
        tier: QualityTier,
    ) -> Result<ImageRef, ServiceError>;
}

/// A text-removal service that is never available.
///
/// Used when no generative model is configured, which sends synthesis
/// straight to local inpainting.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTextRemoval;

#[async_trait]
impl TextRemovalService for NoTextRemoval {
    async fn remove_text(
        &self,
        _prompt: &str,
        _image: &ImageRef,
        tier: QualityTier,
    ) -> Result<ImageRef, ServiceError> {
        Err(ServiceError::Unavailable(format!(
            "no text-removal service configured for tier {tier}"
        )))
    }
}

/// Await `future`, failing with [`ServiceError::Timeout`] after `limit`.
pub(crate) async fn with_timeout<T, F>(limit: Duration, future: F) -> Result<T, ServiceError>
where
    F: std::future::Future<Output = Result<T, ServiceError>>,
{
    tokio::time::timeout(limit, future)
        .await
        .unwrap_or(Err(ServiceError::Timeout(limit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order_and_names() {
        assert_eq!(QualityTier::ORDERED[0], QualityTier::HighFidelity);
        assert_eq!(QualityTier::Fast.to_string(), "fast");
        let json = serde_json::to_string(&QualityTier::HighFidelity).expect("serialize");
        assert_eq!(json, "\"high_fidelity\"");
    }

    #[tokio::test]
    async fn test_no_text_removal_is_unavailable() {
        let result = NoTextRemoval
            .remove_text("p", &ImageRef::from("data:,"), QualityTier::Fast)
            .await;
        assert!(matches!(result, Err(ServiceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_service_error() {
        let limit = Duration::from_millis(10);
        let result: Result<(), _> = with_timeout(limit, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(ServiceError::Timeout(limit)));
    }
}
