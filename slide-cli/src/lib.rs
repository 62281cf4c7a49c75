//! # Slidecraft CLI
//!
//! Command-line host for the slide pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Import a slide with a recorded vision-model answer
//! slidecraft import slide.png --analysis answer.json --topic "Q3 review"
//!
//! # Export a saved presentation
//! slidecraft export pres_1700000000000 --formats png,html,json
//!
//! slidecraft list
//! slidecraft inspect pres_1700000000000
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Resolved store and output directories plus the command
//! - [`recorded`] - File-backed vision and text-removal services
//! - [`commands`] - One function per subcommand, each returning its report

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod commands;
pub mod recorded;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

pub use commands::run;

/// Default directory of the presentation store.
pub const DEFAULT_STORE_DIR: &str = "slidecraft-data";

/// Command-line arguments for slidecraft.
#[derive(Debug, Clone, Parser)]
#[command(name = "slidecraft")]
#[command(about = "Turn slide images into editable documents")]
#[command(version)]
pub struct CliArgs {
    /// Directory holding saved presentations
    #[arg(long, env = "SLIDECRAFT_STORE_DIR", default_value = DEFAULT_STORE_DIR)]
    pub store_dir: PathBuf,

    /// Directory exported files are written to
    #[arg(long, env = "SLIDECRAFT_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Import a slide image as a new presentation
    Import {
        /// Slide image (PNG, JPEG or WebP)
        image: PathBuf,
        /// Recorded vision-model answer for this image
        #[arg(long)]
        analysis: PathBuf,
        /// Pre-rendered text-free background; local inpainting is used without one
        #[arg(long)]
        background: Option<PathBuf>,
        /// Topic shown in listings
        #[arg(long, default_value = "Untitled")]
        topic: String,
        /// Presentation id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Export a saved presentation
    Export {
        /// Presentation id
        id: String,
        /// Comma-separated formats: png, jpg, svg, html, json
        #[arg(long, value_delimiter = ',', default_value = "png,html")]
        formats: Vec<String>,
    },
    /// Show a saved presentation
    Inspect {
        /// Presentation id
        id: String,
    },
    /// List saved presentations
    List,
    /// Delete a saved presentation
    Delete {
        /// Presentation id
        id: String,
    },
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory holding saved presentations.
    pub store_dir: PathBuf,
    /// Directory exported files are written to.
    pub output_dir: PathBuf,
    /// Command to run.
    pub command: Command,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            store_dir: args.store_dir,
            output_dir: args.output_dir,
            command: args.command,
        }
    }
}

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading an input file failed.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// An input file is not a supported image.
    #[error("{0} is not a PNG, JPEG or WebP image")]
    UnsupportedImage(PathBuf),

    /// An export format name was not recognized.
    #[error("unknown export format: {0}")]
    UnknownFormat(String),

    /// The presentation store failed.
    #[error(transparent)]
    Store(#[from] slide_core::StoreError),

    /// Importing the slide failed.
    #[error(transparent)]
    Pipeline(#[from] slide_vision::PipelineError),

    /// Exporting failed.
    #[error(transparent)]
    Export(#[from] slide_renderer::ExportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_args() {
        let args = CliArgs::try_parse_from([
            "slidecraft",
            "--store-dir",
            "/tmp/store",
            "import",
            "slide.png",
            "--analysis",
            "answer.json",
            "--topic",
            "Roadmap",
        ])
        .expect("parse");
        let config = CliConfig::from(args);
        assert_eq!(config.store_dir, PathBuf::from("/tmp/store"));
        match config.command {
            Command::Import {
                image,
                analysis,
                background,
                topic,
                id,
            } => {
                assert_eq!(image, PathBuf::from("slide.png"));
                assert_eq!(analysis, PathBuf::from("answer.json"));
                assert!(background.is_none());
                assert_eq!(topic, "Roadmap");
                assert!(id.is_none());
            }
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_export_formats() {
        let args = CliArgs::try_parse_from(["slidecraft", "export", "p1", "--formats", "png,json"])
            .expect("parse");
        match args.command {
            Command::Export { id, formats } => {
                assert_eq!(id, "p1");
                assert_eq!(formats, vec!["png", "json"]);
            }
            other => panic!("expected export, got {other:?}"),
        }
    }

    #[test]
    fn test_import_requires_analysis() {
        assert!(CliArgs::try_parse_from(["slidecraft", "import", "slide.png"]).is_err());
    }
}
