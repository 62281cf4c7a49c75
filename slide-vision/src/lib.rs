//! # Slidecraft Vision
//!
//! Imports a flat slide image as an editable scene document.
//!
//! ```text
//! slide image ──► AnalysisAdapter ──► SceneDocument (elements)
//!                                         │
//!                 BackgroundSynthesizer ◄─┘
//!                   1. text-removal service, tier by tier
//!                   2. local inpainting
//!                   3. original image
//!                         │
//!                         ▼
//!                 SceneDocument (elements + background)
//! ```
//!
//! Both external models sit behind async traits in [`service`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod pipeline;
pub mod service;
pub mod synthesis;

pub use analysis::{
    parse_analysis_response, strip_code_fences, AnalysisAdapter, AnalysisConfig, AnalysisError,
    ANALYSIS_PROMPT,
};
pub use pipeline::{PipelineError, SlidePipeline};
pub use service::{NoTextRemoval, QualityTier, ServiceError, TextRemovalService, VisionService};
pub use synthesis::{
    BackgroundSynthesizer, Synthesis, SynthesisConfig, SynthesisOutcome, TEXT_REMOVAL_PROMPT,
};
