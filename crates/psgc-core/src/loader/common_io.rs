// crates/psgc-core/src/loader/common_io.rs
use crate::error::{PsgcError, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

#[cfg(feature = "compact")]
use flate2::read::GzDecoder;

/// Folder the CLI looks in when no source file is given.
pub const CSV_FOLDER: &str = "files/csv";

/// Opens `path` for reading, gunzipping it when it ends in `.gz`.
pub fn open_stream(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| PsgcError::io(path.display().to_string(), e))?;

    let reader = BufReader::new(file);

    #[cfg(feature = "compact")]
    {
        if is_gzip(path) {
            return Ok(Box::new(GzDecoder::new(reader)));
        }
    }

    Ok(Box::new(reader))
}

pub fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// `files/csv/psgc_<year>.csv`, the publication naming convention.
pub fn default_source_path(year: i32) -> PathBuf {
    PathBuf::from(CSV_FOLDER).join(format!("psgc_{year}.csv"))
}
