//! Reference dataset loading.
//!
//! Reads tabular records and builds a [`ReferenceSet`] from one key column.
//! The upstream dataset is a spreadsheet export; this loader consumes its
//! CSV form and reads column index 2 (0-based) by default.

use super::ReferenceSet;
use crate::{Error, Result};
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument};

/// Default 0-based index of the key column in the reference dataset.
pub const DEFAULT_KEY_COLUMN: usize = 2;

/// Loads a reference set from a CSV file.
///
/// The first row is treated as headers and skipped. Each subsequent record
/// must carry an integer value at `key_column`.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the file cannot be opened, and
/// [`Error::Format`] if a record is missing the key column or the key cell
/// is non-numeric.
#[instrument(skip_all, fields(operation = "load_reference_csv", path = %path.as_ref().display(), key_column))]
pub fn load_reference_csv(path: impl AsRef<Path>, key_column: usize) -> Result<ReferenceSet> {
    let file = std::fs::File::open(path.as_ref()).map_err(|e| Error::OperationFailed {
        operation: "open_reference_file".to_string(),
        cause: e.to_string(),
    })?;
    load_reference_records(file, key_column)
}

/// Loads a reference set from CSV records on any reader.
///
/// # Errors
///
/// Returns [`Error::Format`] on short rows, non-numeric key cells, or
/// unreadable CSV data.
pub fn load_reference_records(reader: impl Read, key_column: usize) -> Result<ReferenceSet> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut keys = Vec::new();

    for (row, record) in csv_reader.records().enumerate() {
        // Header is row 0 as far as the reader is concerned; report the
        // human-visible line number.
        let line = row + 2;

        let record = record.map_err(|e| Error::Format(format!("row {line}: {e}")))?;

        let cell = record.get(key_column).ok_or_else(|| {
            Error::Format(format!(
                "row {line}: missing key column {key_column} (record has {} fields)",
                record.len()
            ))
        })?;

        let key: i64 = cell.parse().map_err(|_| {
            Error::Format(format!(
                "row {line}: non-numeric key '{cell}' in column {key_column}"
            ))
        })?;

        keys.push(key);
    }

    let set = ReferenceSet::from_keys(keys);
    info!(size = set.len(), "loaded reference set");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identifier;
    use std::io::Cursor;

    const DATA: &str = "\
name,room,badge
alice,12,42
bob,14,777
carol,9,1000
";

    #[test]
    fn test_load_key_column() {
        let set = load_reference_records(Cursor::new(DATA), 2).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(Identifier::new(42)));
        assert!(set.contains(Identifier::new(777)));
        assert!(!set.contains(Identifier::new(12)));
    }

    #[test]
    fn test_load_other_column() {
        let set = load_reference_records(Cursor::new(DATA), 1).unwrap();
        assert!(set.contains(Identifier::new(14)));
        assert!(!set.contains(Identifier::new(42)));
    }

    #[test]
    fn test_missing_column_is_format_error() {
        let data = "a,b\n1,2\n";
        let err = load_reference_records(Cursor::new(data), 2).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_non_numeric_key_is_format_error() {
        let data = "a,b,c\n1,2,three\n";
        let err = load_reference_records(Cursor::new(data), 2).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert!(err.to_string().contains("three"));
    }

    #[test]
    fn test_error_reports_offending_row() {
        let data = "a,b,c\n1,2,3\n4,5,bad\n";
        let err = load_reference_records(Cursor::new(data), 2).unwrap_err();
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn test_empty_file_yields_empty_set() {
        let set = load_reference_records(Cursor::new("a,b,c\n"), 2).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(DATA.as_bytes()).unwrap();

        let set = load_reference_csv(tmp.path(), DEFAULT_KEY_COLUMN).unwrap();
        assert!(set.contains(Identifier::new(1000)));
    }

    #[test]
    fn test_missing_file_is_operation_failed() {
        let err = load_reference_csv("/nonexistent/ref.csv", 2).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }
}
