use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::import::{file_extension, ImportFormat};
use crate::models::LogEntry;

/// Importer for JSON arrays of log entries (camelCase fields)
pub struct JsonImporter;

impl JsonImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn read_entries<R: Read>(&self, reader: R) -> Result<Vec<LogEntry>> {
        let entries: Vec<LogEntry> =
            serde_json::from_reader(BufReader::new(reader)).map_err(ImportError::from)?;
        Ok(entries)
    }
}

impl Default for JsonImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for JsonImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_extension(file_path).is_some_and(|ext| ext == "json")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<LogEntry>> {
        let file = File::open(file_path)?;
        self.read_entries(file)
    }

    fn get_format_name(&self) -> &'static str {
        "JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlareWatchError;

    #[test]
    fn test_reads_camel_case_entries() {
        let json = r#"[
            {"date": "2024-03-01", "backPain": 6, "dailyFunction": 7.5, "flare": "Yes",
             "symptoms": ["headache"], "painLocation": "lower back"},
            {"date": "2024-03-02", "legacyPain": 4, "bpm": 71, "flare": false}
        ]"#;

        let entries = JsonImporter::new().read_entries(json.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].back_pain, Some(6.0));
        assert_eq!(entries[0].daily_function, Some(7.5));
        assert!(entries[0].flare);
        assert_eq!(entries[0].symptoms, vec!["headache".to_string()]);
        assert_eq!(entries[0].pain_location.as_deref(), Some("lower back"));

        assert_eq!(entries[1].back_pain, Some(4.0));
        assert_eq!(entries[1].bpm, Some(71.0));
        assert!(!entries[1].flare);
    }

    #[test]
    fn test_string_encoded_numbers() {
        let json = r#"[
            {"date": "2024-03-01", "fatigue": "7", "sleep": "", "legacyPain": "4.5"},
            {"date": "2024-03-02", "fatigue": "n/a", "steps": "6200", "flare": "no"}
        ]"#;

        let entries = JsonImporter::new().read_entries(json.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].fatigue, Some(7.0));
        assert_eq!(entries[0].sleep, None);
        assert_eq!(entries[0].back_pain, Some(4.5));
        assert_eq!(entries[1].fatigue, None);
        assert_eq!(entries[1].steps, Some(6200.0));
        assert!(!entries[1].flare);
    }

    #[test]
    fn test_malformed_json() {
        let err = JsonImporter::new()
            .read_entries("{\"date\": ".as_bytes())
            .unwrap_err();
        assert!(matches!(err, FlareWatchError::Import(ImportError::Json(_))));
    }
}
