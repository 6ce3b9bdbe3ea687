use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ImportError, Result};
use crate::import::{file_extension, ImportFormat};
use crate::models::{parse_flare, parse_metric_value, LogEntry, Metric};

/// What a CSV column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Date,
    Value(Metric),
    Flare,
    Notes,
    Ignored,
}

/// Importer for the journal's CSV export
///
/// Expected headers: `Date, BPM, Weight, Fatigue, Stiffness, Back Pain,
/// Sleep, Joint Pain, Mobility, Daily Function, Swelling, Flare, Mood,
/// Irritability, Notes`, optionally with `Steps`, `Hydration` and
/// `Weather Sensitivity`. Header matching ignores case, spaces and
/// punctuation; unknown columns are skipped.
pub struct JournalCsvImporter {
    delimiter: u8,
}

impl JournalCsvImporter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    fn classify_header(header: &str) -> Column {
        let normalized: String = header
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "date" | "day" => Column::Date,
            "notes" | "note" => Column::Notes,
            n if n.starts_with("flare") => Column::Flare,
            _ => header
                .parse::<Metric>()
                .map(Column::Value)
                .unwrap_or(Column::Ignored),
        }
    }

    fn parse_date(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
    }

    /// Read entries from any CSV source
    pub fn read_entries<R: Read>(&self, reader: R) -> Result<Vec<LogEntry>> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<Column> = csv_reader
            .headers()
            .map_err(ImportError::from)?
            .iter()
            .map(Self::classify_header)
            .collect();

        if !columns.contains(&Column::Date) {
            return Err(ImportError::MissingColumn {
                column: "Date".to_string(),
            }
            .into());
        }
        let ignored = columns.iter().filter(|c| **c == Column::Ignored).count();
        if ignored > 0 {
            debug!(ignored, "skipping unrecognised CSV columns");
        }

        let mut entries = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record.map_err(ImportError::from)?;
            // Header is row 1
            let row = index + 2;

            let date_field = columns
                .iter()
                .position(|c| *c == Column::Date)
                .and_then(|i| record.get(i))
                .unwrap_or("");
            if date_field.is_empty() {
                warn!(row, "skipping row without a date");
                continue;
            }
            let date = Self::parse_date(date_field).ok_or_else(|| ImportError::InvalidDate {
                row,
                value: date_field.to_string(),
            })?;

            let mut entry = LogEntry::new(date);
            for (column, field) in columns.iter().zip(record.iter()) {
                match column {
                    Column::Value(metric) => entry.set_value(*metric, parse_metric_value(field)),
                    Column::Flare => entry.flare = parse_flare(field),
                    Column::Notes if !field.is_empty() => entry.notes = Some(field.to_string()),
                    _ => {}
                }
            }
            entries.push(entry);
        }

        Ok(entries)
    }
}

impl Default for JournalCsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for JournalCsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_extension(file_path).is_some_and(|ext| ext == "csv")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<LogEntry>> {
        let file = File::open(file_path)?;
        self.read_entries(file)
    }

    fn get_format_name(&self) -> &'static str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlareWatchError;

    const EXPORT: &str = "\
Date,BPM,Weight,Fatigue,Stiffness,Back Pain,Sleep,Joint Pain,Mobility,Daily Function,Swelling,Flare,Mood,Irritability,Notes
2024-03-01,68,72.5,4,3,5,7,2,8,8,1,No,7,2,Good day
2024-03-02,74,72.4,7,6,8,4,5,5,4,3,Yes,3,6,\"Bad night, stiff morning\"
";

    #[test]
    fn test_reads_journal_export() {
        let entries = JournalCsvImporter::new().read_entries(EXPORT.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(first.bpm, Some(68.0));
        assert_eq!(first.weight, Some(72.5));
        assert_eq!(first.back_pain, Some(5.0));
        assert_eq!(first.daily_function, Some(8.0));
        assert!(!first.flare);
        assert_eq!(first.notes.as_deref(), Some("Good day"));

        let second = &entries[1];
        assert!(second.flare);
        assert_eq!(second.mood, Some(3.0));
        assert_eq!(second.notes.as_deref(), Some("Bad night, stiff morning"));
    }

    #[test]
    fn test_blank_and_garbage_values_are_absent() {
        let csv = "Date,Fatigue,Sleep,Steps\n2024-03-01,,n/a,0\n";
        let entries = JournalCsvImporter::new().read_entries(csv.as_bytes()).unwrap();

        assert_eq!(entries[0].fatigue, None);
        assert_eq!(entries[0].sleep, None);
        // Zero steps is a real value
        assert_eq!(entries[0].steps, Some(0.0));
    }

    #[test]
    fn test_optional_columns_and_legacy_header() {
        let csv = "date,Legacy Pain,Hydration,Weather Sensitivity,Mood Ring\n2024-03-01,6,8,3,x\n";
        let entries = JournalCsvImporter::new().read_entries(csv.as_bytes()).unwrap();

        assert_eq!(entries[0].back_pain, Some(6.0));
        assert_eq!(entries[0].hydration, Some(8.0));
        assert_eq!(entries[0].weather_sensitivity, Some(3.0));
    }

    #[test]
    fn test_missing_date_column() {
        let err = JournalCsvImporter::new()
            .read_entries("Fatigue,Sleep\n4,5\n".as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            FlareWatchError::Import(ImportError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_invalid_date_reports_row() {
        let csv = "Date,Fatigue\n2024-03-01,4\n03/02/2024,5\n";
        let err = JournalCsvImporter::new().read_entries(csv.as_bytes()).unwrap_err();
        match err {
            FlareWatchError::Import(ImportError::InvalidDate { row, value }) => {
                assert_eq!(row, 3);
                assert_eq!(value, "03/02/2024");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv = "Date;Fatigue;Flare\n2024-03-01;4;yes\n";
        let entries = JournalCsvImporter::with_delimiter(b';')
            .read_entries(csv.as_bytes())
            .unwrap();
        assert_eq!(entries[0].fatigue, Some(4.0));
        assert!(entries[0].flare);
    }
}
