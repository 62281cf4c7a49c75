//! File-backed stand-ins for the external models.

use std::path::Path;

use async_trait::async_trait;
use slide_core::ImageRef;
use slide_renderer::image::{data_uri_from_bytes, ImageFormat};
use slide_vision::{QualityTier, ServiceError, TextRemovalService, VisionService};

use crate::CliError;

/// Answers every analysis request with a recorded response.
#[derive(Debug, Clone)]
pub struct RecordedVision {
    response: String,
}

impl RecordedVision {
    /// Serve `response` for every image.
    #[must_use]
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }

    /// Read the recorded response from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Read`] if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        std::fs::read_to_string(path)
            .map(Self::new)
            .map_err(|source| CliError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[async_trait]
impl VisionService for RecordedVision {
    async fn analyze_image(&self, _prompt: &str, _image: &ImageRef) -> Result<String, ServiceError> {
        Ok(self.response.clone())
    }
}

/// Serves a pre-rendered background at every tier, or is unavailable.
#[derive(Debug, Clone, Default)]
pub struct RecordedTextRemoval {
    background: Option<ImageRef>,
}

impl RecordedTextRemoval {
    /// Serve `background`, or fail every request when `None`.
    #[must_use]
    pub fn new(background: Option<ImageRef>) -> Self {
        Self { background }
    }
}

#[async_trait]
impl TextRemovalService for RecordedTextRemoval {
    async fn remove_text(
        &self,
        _prompt: &str,
        _image: &ImageRef,
        tier: QualityTier,
    ) -> Result<ImageRef, ServiceError> {
        self.background.clone().ok_or_else(|| {
            ServiceError::Unavailable(format!("no recorded background for tier {tier}"))
        })
    }
}

/// Read an image file as a data URI.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a supported image.
pub fn read_image(path: &Path) -> Result<ImageRef, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match ImageFormat::from_magic_bytes(&bytes) {
        ImageFormat::Unknown => Err(CliError::UnsupportedImage(path.to_path_buf())),
        format => {
            tracing::debug!("Read {} ({} bytes, {})", path.display(), bytes.len(), format.mime_type());
            Ok(ImageRef::from(data_uri_from_bytes(format.mime_type(), &bytes)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_image_detects_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let png = dir.path().join("slide.png");
        std::fs::write(&png, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]).expect("write");
        let image = read_image(&png).expect("read");
        assert!(image.as_str().starts_with("data:image/png;base64,"));

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "hello").expect("write");
        assert!(matches!(read_image(&text), Err(CliError::UnsupportedImage(_))));

        assert!(matches!(
            read_image(&dir.path().join("missing.png")),
            Err(CliError::Read { .. })
        ));
    }

    #[tokio::test]
    async fn test_recorded_text_removal_without_background() {
        let service = RecordedTextRemoval::default();
        let result = service
            .remove_text("p", &ImageRef::from("data:,"), QualityTier::Fast)
            .await;
        assert!(matches!(result, Err(ServiceError::Unavailable(_))));
    }
}
