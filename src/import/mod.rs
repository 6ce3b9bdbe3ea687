use std::path::Path;
use tracing::info;

use crate::error::{ImportError, Result};
use crate::models::LogEntry;

pub mod csv;
pub mod json;

/// Trait for reading journal entries from different file formats
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Read every entry in the file
    fn import_file(&self, file_path: &Path) -> Result<Vec<LogEntry>>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Picks an importer by file extension
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn ImportFormat>> = vec![
            Box::new(csv::JournalCsvImporter::new()),
            Box::new(json::JsonImporter::new()),
        ];

        Self { importers }
    }

    /// Import a single file, auto-detecting the format
    pub fn import_file(&self, file_path: &Path) -> Result<Vec<LogEntry>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound {
                path: file_path.to_path_buf(),
            }
            .into());
        }

        let importer = self
            .importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .ok_or_else(|| ImportError::UnsupportedFormat {
                format: file_extension(file_path).unwrap_or_else(|| "unknown".to_string()),
            })?;

        let entries = importer.import_file(file_path)?;
        info!(
            path = %file_path.display(),
            format = importer.get_format_name(),
            entries = entries.len(),
            "journal imported"
        );
        Ok(entries)
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased extension of a path, if any
pub(crate) fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}
