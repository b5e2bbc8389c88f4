//! Shared CSV helpers for schema tables.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{Result, StoreError};

/// One table row keyed by column header.
pub(crate) type Row = BTreeMap<String, String>;

/// Read a CSV file into row maps.
///
/// Returns `None` when the file does not exist: an absent table is an empty
/// section. Header names are stripped of a byte order mark; cell values are
/// kept verbatim. Every column in `required` must be present.
pub(crate) fn read_csv_rows(path: &Path, required: &[&'static str]) -> Result<Option<Vec<Row>>> {
    if !path.is_file() {
        return Ok(None);
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| csv_error(path, source))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| csv_error(path, source))?
        .iter()
        .map(|header| header.trim_matches('\u{feff}').trim().to_string())
        .collect();
    if let Some(column) = required
        .iter()
        .copied()
        .find(|column| !headers.iter().any(|header| header == column))
    {
        return Err(StoreError::MissingColumn {
            path: path.to_path_buf(),
            column,
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| csv_error(path, source))?;
        let mut row = Row::new();
        for (idx, value) in record.iter().enumerate() {
            if let Some(key) = headers.get(idx) {
                row.insert(key.clone(), value.to_string());
            }
        }
        rows.push(row);
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "read table");
    Ok(Some(rows))
}

/// Get a field value from a row, returning an empty string if not present.
pub(crate) fn get_field<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or_default()
}

/// Write a header and rows to `path`, replacing any existing file.
pub(crate) fn write_csv<I>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let file = File::create(path).map_err(|source| StoreError::io("create", path, source))?;
    let mut writer = WriterBuilder::new().from_writer(file);
    writer
        .write_record(header)
        .map_err(|source| csv_error(path, source))?;
    let mut count = 0usize;
    for row in rows {
        writer
            .write_record(&row)
            .map_err(|source| csv_error(path, source))?;
        count += 1;
    }
    writer
        .flush()
        .map_err(|source| StoreError::io("write", path, source))?;
    tracing::debug!(path = %path.display(), rows = count, "wrote table");
    Ok(())
}

fn csv_error(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_section() {
        let dir = tempfile::tempdir().unwrap();
        let rows = read_csv_rows(&dir.path().join("absent.csv"), &["Name"]).unwrap();
        assert!(rows.is_none());
    }

    #[test]
    fn reads_back_written_rows_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        write_csv(
            &path,
            &["Name", "Description"],
            vec![vec!["A".to_string(), " padded, with comma ".to_string()]],
        )
        .unwrap();

        let rows = read_csv_rows(&path, &["Name", "Description"])
            .unwrap()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(get_field(&rows[0], "Name"), "A");
        assert_eq!(get_field(&rows[0], "Description"), " padded, with comma ");
        assert_eq!(get_field(&rows[0], "Missing"), "");
    }

    #[test]
    fn reports_missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        std::fs::write(&path, "\u{feff}Name\nA\n").unwrap();

        let err = read_csv_rows(&path, &["Name", "Type"]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingColumn { column: "Type", .. }
        ));
        assert!(read_csv_rows(&path, &["Name"]).unwrap().is_some());
    }
}
