//! Integration tests for the slidecraft commands.
//!
//! Drives import, list, inspect, export and delete against a temporary
//! store directory.

use std::path::{Path, PathBuf};

use slide_cli::{run, CliConfig, CliError, Command};
use slide_core::PresentationStore;

const ANALYSIS: &str = r##"```json
{
  "backgroundColor": "#202020",
  "elements": [
    {"id": "title", "type": "text", "x": 100, "y": 200, "width": 500, "height": 60, "zIndex": 2,
     "content": "Launch plan", "fontSize": 40, "color": "#FFFFFF"},
    {"id": "logo", "type": "image", "x": 1700, "y": 40, "width": 120, "height": 120, "zIndex": 1, "src": ""}
  ]
}
```"##;

struct Workspace {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().to_path_buf();

        let img = image::RgbaImage::from_pixel(320, 180, image::Rgba([32, 32, 32, 255]));
        img.save(root.join("slide.png")).expect("write slide");
        std::fs::write(root.join("analysis.json"), ANALYSIS).expect("write analysis");

        Self { _dir: dir, root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn config(&self, command: Command) -> CliConfig {
        CliConfig {
            store_dir: self.path("store"),
            output_dir: self.path("out"),
            command,
        }
    }

    async fn run(&self, command: Command) -> Result<String, CliError> {
        run(self.config(command)).await
    }

    async fn import(&self, id: &str) -> String {
        self.run(Command::Import {
            image: self.path("slide.png"),
            analysis: self.path("analysis.json"),
            background: None,
            topic: "Launch".to_string(),
            id: Some(id.to_string()),
        })
        .await
        .expect("import")
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ==========================================================================
// Import
// ==========================================================================

#[tokio::test]
async fn test_import_saves_record_with_background() {
    let ws = Workspace::new();
    let report = ws.import("deck").await;
    assert!(report.contains("Imported deck (2 elements"));

    let store = PresentationStore::with_data_dir(ws.path("store")).expect("store");
    let record = store.load("deck").expect("record");
    assert_eq!(record.topic, "Launch");
    assert!(record.thumbnail.is_some());

    let doc = &record.document;
    assert_eq!(doc.background_color(), Some("#202020"));
    assert!(doc.original_image().is_some());
    assert!(doc.background_image().is_some());
}

#[tokio::test]
async fn test_import_with_recorded_background() {
    let ws = Workspace::new();
    let clean = image::RgbaImage::from_pixel(320, 180, image::Rgba([0, 0, 0, 255]));
    clean.save(ws.path("clean.png")).expect("write background");

    let report = ws
        .run(Command::Import {
            image: ws.path("slide.png"),
            analysis: ws.path("analysis.json"),
            background: Some(ws.path("clean.png")),
            topic: "Launch".to_string(),
            id: Some("deck".to_string()),
        })
        .await
        .expect("import");
    assert!(report.contains("Service(HighFidelity)"));
}

#[tokio::test]
async fn test_import_rejects_non_image() {
    let ws = Workspace::new();
    let err = ws
        .run(Command::Import {
            image: ws.path("analysis.json"),
            analysis: ws.path("analysis.json"),
            background: None,
            topic: "x".to_string(),
            id: None,
        })
        .await
        .expect_err("not an image");
    assert!(matches!(err, CliError::UnsupportedImage(_)));
}

// ==========================================================================
// Browse
// ==========================================================================

#[tokio::test]
async fn test_list_and_inspect() {
    let ws = Workspace::new();
    assert_eq!(ws.run(Command::List).await.expect("list"), "No presentations");

    ws.import("deck").await;
    let listing = ws.run(Command::List).await.expect("list");
    assert!(listing.starts_with("deck\tLaunch\t2 elements"));

    let details = ws
        .run(Command::Inspect {
            id: "deck".to_string(),
        })
        .await
        .expect("inspect");
    assert!(details.contains("background image: synthesized"));
    assert!(details.contains("text title at (100, 200) 500x60 \"Launch plan\""));
}

#[tokio::test]
async fn test_delete() {
    let ws = Workspace::new();
    ws.import("deck").await;
    ws.run(Command::Delete {
        id: "deck".to_string(),
    })
    .await
    .expect("delete");

    let err = ws
        .run(Command::Inspect {
            id: "deck".to_string(),
        })
        .await
        .expect_err("deleted");
    assert!(matches!(err, CliError::Store(_)));
}

// ==========================================================================
// Export
// ==========================================================================

#[tokio::test]
async fn test_export_writes_requested_formats() {
    let ws = Workspace::new();
    ws.import("deck").await;

    let report = ws
        .run(Command::Export {
            id: "deck".to_string(),
            formats: vec!["png".to_string(), "html".to_string(), "json".to_string()],
        })
        .await
        .expect("export");
    assert_eq!(report.lines().count(), 3);

    let files = files_in(&ws.path("out"));
    assert_eq!(files.len(), 3);
    assert!(files.iter().any(|f| f.starts_with("ppt-slide-") && f.ends_with(".png")));
    assert!(files.iter().any(|f| f.starts_with("ppt-slide-") && f.ends_with(".html")));
    assert!(files.iter().any(|f| f.starts_with("ppt-data-") && f.ends_with(".json")));
}

#[tokio::test]
async fn test_export_unknown_format() {
    let ws = Workspace::new();
    ws.import("deck").await;
    let err = ws
        .run(Command::Export {
            id: "deck".to_string(),
            formats: vec!["pdf".to_string()],
        })
        .await
        .expect_err("unknown format");
    assert!(matches!(err, CliError::UnknownFormat(ref f) if f == "pdf"));
}
