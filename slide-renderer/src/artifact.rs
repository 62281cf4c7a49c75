//! Named export files.

use std::path::{Path, PathBuf};

use crate::error::ExportResult;

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Flattened PNG raster at canvas size.
    Png,
    /// Flattened JPEG raster at canvas size.
    Jpeg,
    /// The SVG used for rasterization.
    Svg,
    /// Standalone HTML page.
    Html,
    /// Raw document JSON.
    Json,
}

impl ExportFormat {
    /// All formats.
    pub const ALL: [Self; 5] = [Self::Png, Self::Jpeg, Self::Svg, Self::Html, Self::Json];

    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Svg => "svg",
            Self::Html => "html",
            Self::Json => "json",
        }
    }

    /// MIME type of the exported bytes.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
            Self::Html => "text/html",
            Self::Json => "application/json",
        }
    }

    /// Parse a format name or extension, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim_start_matches('.').to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "svg" => Some(Self::Svg),
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Timestamped file name, e.g. `ppt-slide-1700000000000.png`.
    ///
    /// Raw JSON exports use the `ppt-data-` prefix.
    #[must_use]
    pub fn file_name(self, timestamp_ms: u64) -> String {
        let prefix = match self {
            Self::Json => "ppt-data",
            _ => "ppt-slide",
        };
        format!("{prefix}-{timestamp_ms}.{}", self.extension())
    }
}

/// An exported file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name.
    pub file_name: String,
    /// Format of the bytes.
    pub format: ExportFormat,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Create an artifact with a file name stamped with the current time.
    #[must_use]
    pub fn timestamped(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format.file_name(slide_core::store::current_timestamp_ms()),
            format,
            bytes,
        }
    }

    /// MIME type of the artifact.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Write the artifact into `dir` under its file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn write_to(&self, dir: &Path) -> ExportResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}
