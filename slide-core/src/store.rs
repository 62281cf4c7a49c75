//! Presentation storage.
//!
//! Provides a thread-safe [`PresentationStore`] that keeps saved slide
//! documents in memory and, when given a data directory, persists each record
//! as a pretty-printed JSON file named after its sanitized ID.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::{ImageRef, SceneDocument};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("Presentation not found: {0}")]
    RecordNotFound(String),
    /// The operation needs a data directory and the store has none.
    #[error("No data directory configured")]
    NoDataDir,
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A saved presentation: one slide document plus listing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRecord {
    /// Record identifier.
    pub id: String,
    /// Human-readable topic shown in listings.
    pub topic: String,
    /// The slide document.
    pub document: SceneDocument,
    /// Small preview image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageRef>,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Last save time in milliseconds since the Unix epoch.
    pub last_modified: u64,
}

impl PresentationRecord {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, topic: impl Into<String>, document: SceneDocument) -> Self {
        let now = current_timestamp_ms();
        Self {
            id: id.into(),
            topic: topic.into(),
            document,
            thumbnail: None,
            created_at: now,
            last_modified: now,
        }
    }

    /// Attach a thumbnail.
    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: ImageRef) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }
}

/// Thread-safe presentation storage with optional filesystem persistence.
#[derive(Debug, Clone, Default)]
pub struct PresentationStore {
    records: Arc<RwLock<HashMap<String, PresentationRecord>>>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl PresentationStore {
    /// Create an in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with filesystem persistence.
    ///
    /// The directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            records: Arc::default(),
            data_dir: Some(data_dir),
        })
    }

    /// The data directory, if persistence is enabled.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Save a record, creating or replacing it.
    ///
    /// An existing record keeps its creation time; `last_modified` is set to
    /// now. Returns the record as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written to disk.
    pub fn save(&self, mut record: PresentationRecord) -> Result<PresentationRecord, StoreError> {
        {
            let mut records = self
                .records
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(existing) = records.get(&record.id) {
                record.created_at = existing.created_at;
            }
            record.last_modified = current_timestamp_ms().max(record.created_at);
            // Memory only reflects what reached disk.
            self.persist_record(&record)?;
            records.insert(record.id.clone(), record.clone());
        }
        tracing::debug!("Saved presentation {}", record.id);
        Ok(record)
    }

    /// Replace the document of an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RecordNotFound`] if the record does not exist,
    /// or an I/O error if it cannot be written.
    pub fn update_document(
        &self,
        id: &str,
        document: SceneDocument,
    ) -> Result<PresentationRecord, StoreError> {
        let mut record = self.load(id)?;
        record.document = document;
        self.save(record)
    }

    /// Get a record held in memory.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<PresentationRecord> {
        let records = self
            .records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        records.get(id).cloned()
    }

    /// Get a record from memory, falling back to disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RecordNotFound`] if the record exists in neither.
    pub fn load(&self, id: &str) -> Result<PresentationRecord, StoreError> {
        if let Some(record) = self.get(id) {
            return Ok(record);
        }
        match self.load_record_from_disk(id) {
            Ok(record) => Ok(record),
            Err(StoreError::NoDataDir) => Err(StoreError::RecordNotFound(id.to_string())),
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::RecordNotFound(id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// All records in memory, most recently modified first.
    #[must_use]
    pub fn list(&self) -> Vec<PresentationRecord> {
        let records = self
            .records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut list: Vec<_> = records.values().cloned().collect();
        list.sort_by(|a, b| {
            b.last_modified
                .cmp(&a.last_modified)
                .then_with(|| a.id.cmp(&b.id))
        });
        list
    }

    /// Delete a record from memory and disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RecordNotFound`] if the record exists in neither,
    /// or an I/O error if the file cannot be removed.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let in_memory = {
            let mut records = self
                .records
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            records.remove(id).is_some()
        };
        let on_disk = match self.record_path(id) {
            Some(path) if path.exists() => {
                std::fs::remove_file(&path)?;
                true
            }
            _ => false,
        };
        if in_memory || on_disk {
            Ok(())
        } else {
            Err(StoreError::RecordNotFound(id.to_string()))
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn record_path(&self, id: &str) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", sanitize_filename(id))))
    }

    /// Write a record to disk. No-op without a data directory.
    fn persist_record(&self, record: &PresentationRecord) -> Result<(), StoreError> {
        let Some(path) = self.record_path(&record.id) else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        std::fs::write(&path, json)?;
        Ok(())
    }

    /// Load a single record from disk into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist or can't be parsed.
    pub fn load_record_from_disk(&self, id: &str) -> Result<PresentationRecord, StoreError> {
        let path = self.record_path(id).ok_or(StoreError::NoDataDir)?;
        let record = read_record(&path)?;
        let mut records = self
            .records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    /// Load every record in the data directory into memory.
    ///
    /// Files that fail to parse are skipped with a warning. Returns the IDs
    /// of the records loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory can't be read.
    pub fn load_all_from_disk(&self) -> Result<Vec<String>, StoreError> {
        let data_dir = self.data_dir.as_ref().ok_or(StoreError::NoDataDir)?;
        let mut loaded = Vec::new();
        for entry in std::fs::read_dir(data_dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match read_record(&path) {
                Ok(record) => {
                    loaded.push(record.id.clone());
                    let mut records = self
                        .records
                        .write()
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    records.insert(record.id.clone(), record);
                }
                Err(e) => tracing::warn!("Skipping unreadable record {}: {e}", path.display()),
            }
        }
        loaded.sort();
        Ok(loaded)
    }
}

fn read_record(path: &Path) -> Result<PresentationRecord, StoreError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Sanitize a record ID for use as a filename.
///
/// Replaces any character that is not alphanumeric, `-`, or `_` with `_`.
fn sanitize_filename(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Get the current Unix timestamp in milliseconds.
#[must_use]
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}
