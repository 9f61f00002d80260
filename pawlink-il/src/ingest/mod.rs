//! Ingestion boundary
//!
//! Reads one delimited source file into immutable SourceRecords. Column
//! names are normalized here, before records reach the core, so field maps
//! can reference a stable schema. Rows that violate shape or encoding
//! expectations are propagated as errors, never skipped: silently dropping
//! rows would corrupt identity linkage.

use std::path::Path;

use pawlink_common::{Encoding, Error, Result};

use crate::models::SourceRecord;

/// Normalize a raw column name: lowercase, trim, and replace runs of
/// whitespace or periods with a single underscore.
pub fn normalize_column_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().to_lowercase().chars() {
        if ch.is_whitespace() || ch == '.' {
            if !out.is_empty() {
                pending_sep = true;
            }
        } else {
            if pending_sep {
                out.push('_');
                pending_sep = false;
            }
            out.push(ch);
        }
    }
    out
}

fn decode(bytes: Vec<u8>, encoding: Encoding) -> Result<String> {
    match encoding {
        Encoding::Utf8 => String::from_utf8(bytes)
            .map_err(|e| Error::MalformedInput(format!("Invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()))),
        // Latin-1 maps each byte to the code point of the same value
        Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// Read a delimited source file into SourceRecords.
///
/// `drop_first_column` discards an unnamed leading index column that some
/// exports prepend. Row ids are 0-based input row order (after the header),
/// preserved for reproducible linking.
pub fn read_source(
    path: &Path,
    encoding: Encoding,
    drop_first_column: bool,
) -> Result<Vec<SourceRecord>> {
    let bytes = std::fs::read(path)?;
    let content = decode(bytes, encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let skip = usize::from(drop_first_column);
    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| Error::MalformedInput(format!("{}: {}", path.display(), e)))?
        .iter()
        .skip(skip)
        .map(normalize_column_name)
        .collect();

    let mut records = Vec::new();
    for (row_id, row) in reader.records().enumerate() {
        let row = row.map_err(|e| {
            Error::MalformedInput(format!("{} row {}: {}", path.display(), row_id, e))
        })?;
        if row.len() != columns.len() + skip {
            return Err(Error::MalformedInput(format!(
                "{} row {}: expected {} fields, got {}",
                path.display(),
                row_id,
                columns.len() + skip,
                row.len()
            )));
        }
        let fields = columns
            .iter()
            .cloned()
            .zip(row.iter().skip(skip).map(str::to_string))
            .collect();
        records.push(SourceRecord::new(row_id as u64, fields));
    }

    tracing::debug!(
        path = %path.display(),
        rows = records.len(),
        columns = columns.len(),
        "Read source file"
    );
    Ok(records)
}
