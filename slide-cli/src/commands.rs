//! Subcommand implementations.
//!
//! Each command returns the text to print on success.

use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use slide_core::store::current_timestamp_ms;
use slide_core::{
    CancellationToken, ElementKind, PresentationRecord, PresentationStore, SceneDocument,
};
use slide_renderer::image::{generate_thumbnail, THUMBNAIL_MAX_SIZE};
use slide_renderer::{ExportFormat, SlideExporter};
use slide_vision::SlidePipeline;

use crate::recorded::{read_image, RecordedTextRemoval, RecordedVision};
use crate::{CliConfig, CliError, Command};

/// Run the configured command.
///
/// # Errors
///
/// Returns an error if the command fails.
pub async fn run(config: CliConfig) -> Result<String, CliError> {
    let store = PresentationStore::with_data_dir(&config.store_dir)?;
    match config.command {
        Command::Import {
            image,
            analysis,
            background,
            topic,
            id,
        } => {
            import(
                &store,
                &image,
                &analysis,
                background.as_deref(),
                topic,
                id,
            )
            .await
        }
        Command::Export { id, formats } => export(&store, &id, &formats, &config.output_dir),
        Command::Inspect { id } => inspect(&store, &id),
        Command::List => list(&store),
        Command::Delete { id } => {
            store.delete(&id)?;
            Ok(format!("Deleted {id}"))
        }
    }
}

async fn import(
    store: &PresentationStore,
    image: &Path,
    analysis: &Path,
    background: Option<&Path>,
    topic: String,
    id: Option<String>,
) -> Result<String, CliError> {
    let original = read_image(image)?;
    let vision = RecordedVision::from_file(analysis)?;
    let background = background.map(read_image).transpose()?;
    let pipeline = SlidePipeline::new(
        Arc::new(vision),
        Arc::new(RecordedTextRemoval::new(background)),
    );

    let synthesis = pipeline.import(&original, &CancellationToken::new()).await?;
    if synthesis.outcome.is_degraded() {
        tracing::warn!("Background is degraded: {:?}", synthesis.outcome);
    }

    let id = id.unwrap_or_else(|| format!("pres_{}", current_timestamp_ms()));
    let mut record = PresentationRecord::new(id, topic, synthesis.document);
    match generate_thumbnail(&original, THUMBNAIL_MAX_SIZE) {
        Ok(thumbnail) => record = record.with_thumbnail(thumbnail),
        Err(e) => tracing::warn!("Skipping thumbnail: {e}"),
    }
    let record = store.save(record)?;

    Ok(format!(
        "Imported {} ({} elements, background: {:?})",
        record.id,
        record.document.element_count(),
        synthesis.outcome
    ))
}

fn export(
    store: &PresentationStore,
    id: &str,
    formats: &[String],
    output_dir: &Path,
) -> Result<String, CliError> {
    let formats = formats
        .iter()
        .map(|name| ExportFormat::from_name(name).ok_or_else(|| CliError::UnknownFormat(name.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    let record = store.load(id)?;
    let exporter = SlideExporter::with_defaults();

    let mut report = String::new();
    for format in formats {
        let artifact = exporter.export(&record.document, format)?;
        let path = artifact.write_to(output_dir)?;
        let _ = writeln!(report, "{}", path.display());
    }
    Ok(report.trim_end().to_string())
}

fn inspect(store: &PresentationStore, id: &str) -> Result<String, CliError> {
    let record = store.load(id)?;
    Ok(describe(&record))
}

fn list(store: &PresentationStore) -> Result<String, CliError> {
    store.load_all_from_disk()?;
    let records = store.list();
    if records.is_empty() {
        return Ok("No presentations".to_string());
    }
    let mut report = String::new();
    for record in records {
        let _ = writeln!(
            report,
            "{}\t{}\t{} elements\t{}",
            record.id,
            record.topic,
            record.document.element_count(),
            record.last_modified
        );
    }
    Ok(report.trim_end().to_string())
}

/// Human-readable summary of a record.
#[must_use]
pub fn describe(record: &PresentationRecord) -> String {
    let doc = &record.document;
    let mut out = String::new();
    let _ = writeln!(out, "{} \"{}\"", record.id, record.topic);
    let _ = writeln!(out, "  page: {}", doc.id());
    let _ = writeln!(out, "  background color: {}", doc.effective_background_color());
    let _ = writeln!(out, "  background image: {}", image_status(doc));
    let _ = writeln!(out, "  elements: {}", doc.element_count());
    for element in doc.paint_order() {
        let g = &element.geometry;
        let _ = write!(
            out,
            "    [{}] {} {} at ({}, {}) {}x{}",
            g.z_index,
            element.kind.type_name(),
            element.id,
            g.x,
            g.y,
            g.width,
            g.height
        );
        if let ElementKind::Text { content, .. } = &element.kind {
            let _ = write!(out, " {content:?}");
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn image_status(doc: &SceneDocument) -> &'static str {
    match (doc.background_image(), doc.original_image()) {
        (None, _) => "none",
        (Some(bg), Some(original)) if bg == original => "original",
        (Some(_), _) => "synthesized",
    }
}
