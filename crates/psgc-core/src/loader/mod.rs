// crates/psgc-core/src/loader/mod.rs

//! # CSV Ingestor
//!
//! Handles the Physical Layer (I/O, Decompression) and turns the PSA
//! publication datafile into [`GeographicRecord`]s.
//!
//! The whole file is materialized: the dataset is bounded (tens of thousands
//! of rows), and the bulk loader needs every row up front to deduplicate by
//! code.

use crate::error::{PsgcError, Result};
use crate::model::{GeographicRecord, REQUIRED_HEADERS};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub mod common_io;

pub use common_io::default_source_path;

/// Parses the datafile at `path` (`.csv` or, with `compact`, `.csv.gz`).
pub fn parse(path: impl AsRef<Path>) -> Result<Vec<GeographicRecord>> {
    let path = path.as_ref();
    let reader = common_io::open_stream(path)?;
    let records = parse_with_context(reader, &path.display().to_string())?;
    info!(path = %path.display(), records = records.len(), "parsed PSGC datafile");
    Ok(records)
}

/// Parses an already opened datafile.
pub fn parse_reader<R: Read>(reader: R) -> Result<Vec<GeographicRecord>> {
    parse_with_context(reader, "<reader>")
}

fn parse_with_context<R: Read>(reader: R, context: &str) -> Result<Vec<GeographicRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| map_csv_error(e, context))?
        .clone();
    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .collect();
    if !missing.is_empty() {
        return Err(PsgcError::Parse(format!(
            "{context}: missing required column(s) {}",
            missing.join(", ")
        )));
    }
    debug!(columns = headers.len(), "datafile header accepted");

    rdr.deserialize::<GeographicRecord>()
        .map(|row| row.map_err(|e| map_csv_error(e, context)))
        .collect()
}

fn map_csv_error(err: csv::Error, context: &str) -> PsgcError {
    let line = err.position().map(|p| p.line());
    match err.into_kind() {
        csv::ErrorKind::Io(source) => PsgcError::io(context, source),
        kind => {
            let message = match kind {
                csv::ErrorKind::UnequalLengths {
                    expected_len, len, ..
                } => format!("expected {expected_len} fields, found {len}"),
                csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8: {err}"),
                csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
                other => format!("{other:?}"),
            };
            match line {
                Some(line) => PsgcError::Parse(format!("{context}, line {line}: {message}")),
                None => PsgcError::Parse(format!("{context}: {message}")),
            }
        }
    }
}
