// crates/psgc-core/src/export.rs

//! Per-level JSON snapshots of a loaded catalog: `<year>-regions.json`,
//! `<year>-provinces.json`, `<year>-city-muni.json`, `<year>-barangays.json`
//! and `<year>-masterlist.json`. Each file is one array sorted by code, with
//! the ancestor codes of every entry filled in.

use crate::error::{PsgcError, Result};
use crate::hierarchy::Ancestors;
use crate::model::Level;
use crate::store::Catalog;
use crate::traits::LevelEntity;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[cfg(feature = "compact")]
use flate2::{write::GzEncoder, Compression};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub out_dir: PathBuf,
    pub year: i32,
    /// Write `.json.gz` instead of `.json`. Needs the `compact` feature.
    pub gzip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    pub psgc_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_mun_code: Option<String>,
    pub name: String,
}

impl ExportEntry {
    fn new(code: &str, name: &str, level: Option<Level>) -> Self {
        let Ancestors {
            region,
            province,
            city_muni,
        } = Ancestors::derive(code, level);
        Self {
            psgc_code: code.to_string(),
            region_code: region,
            province_code: province,
            city_mun_code: city_muni,
            name: name.to_string(),
        }
    }
}

/// Writes the five files and returns their paths in write order.
pub fn export_json(catalog: &Catalog, options: &ExportOptions) -> Result<Vec<PathBuf>> {
    if options.gzip && !cfg!(feature = "compact") {
        return Err(PsgcError::Config(
            "gzip export needs the `compact` feature".to_string(),
        ));
    }
    std::fs::create_dir_all(&options.out_dir)
        .map_err(|e| PsgcError::io(options.out_dir.display().to_string(), e))?;

    let mut written = Vec::with_capacity(5);
    written.push(write_level(catalog.regions().all_by_code()?, Some(Level::Region), "regions", options)?);
    written.push(write_level(catalog.provinces().all_by_code()?, Some(Level::Province), "provinces", options)?);
    written.push(write_level(catalog.city_muni().all_by_code()?, Some(Level::CityMuni), "city-muni", options)?);
    written.push(write_level(catalog.barangays().all_by_code()?, Some(Level::Barangay), "barangays", options)?);
    written.push(write_level(catalog.masterlist().all_by_code()?, None, "masterlist", options)?);
    Ok(written)
}

fn write_level<E: LevelEntity>(
    rows: Vec<E>,
    level: Option<Level>,
    stem: &str,
    options: &ExportOptions,
) -> Result<PathBuf> {
    let entries: Vec<ExportEntry> = rows
        .iter()
        .map(|row| ExportEntry::new(row.code(), row.name(), level))
        .collect();

    let extension = if options.gzip { "json.gz" } else { "json" };
    let path = options
        .out_dir
        .join(format!("{}-{stem}.{extension}", options.year));
    let file = File::create(&path).map_err(|e| PsgcError::io(path.display().to_string(), e))?;
    let writer = BufWriter::new(file);

    if options.gzip {
        #[cfg(feature = "compact")]
        {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            write_entries(&mut encoder, &entries, &path)?;
            encoder
                .finish()
                .and_then(|mut inner| inner.flush())
                .map_err(|e| PsgcError::io(path.display().to_string(), e))?;
        }
    } else {
        let mut writer = writer;
        write_entries(&mut writer, &entries, &path)?;
        writer
            .flush()
            .map_err(|e| PsgcError::io(path.display().to_string(), e))?;
    }

    info!(path = %path.display(), entries = entries.len(), "exported");
    Ok(path)
}

fn write_entries(writer: &mut impl Write, entries: &[ExportEntry], path: &Path) -> Result<()> {
    serde_json::to_writer(&mut *writer, entries)?;
    writer
        .write_all(b"\n")
        .map_err(|e| PsgcError::io(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::{load, LoadOptions};
    use crate::model::GeographicRecord;

    fn loaded() -> Catalog {
        let catalog = Catalog::open_in_memory().unwrap();
        let records = vec![
            GeographicRecord::new("0102805001", "Aglipay (Pob.)", "", "Bgy"),
            GeographicRecord::new("0100000000", "Region I (Ilocos Region)", "", "Reg"),
            GeographicRecord::new("0102800000", "Ilocos Norte", "", "Prov"),
        ];
        load(&records, &catalog, &LoadOptions::new()).unwrap();
        catalog
    }

    #[test]
    fn writes_one_file_per_level_with_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            out_dir: dir.path().to_path_buf(),
            year: 2023,
            gzip: false,
        };
        let paths = export_json(&loaded(), &options).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "2023-regions.json",
                "2023-provinces.json",
                "2023-city-muni.json",
                "2023-barangays.json",
                "2023-masterlist.json"
            ]
        );

        let barangays: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths[3]).unwrap()).unwrap();
        assert_eq!(barangays[0]["regionCode"], "0100000000");
        assert_eq!(barangays[0]["provinceCode"], "0102800000");
        assert_eq!(barangays[0]["cityMunCode"], "0102805000");

        let regions: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths[0]).unwrap()).unwrap();
        assert!(regions[0].get("regionCode").is_none());

        let masterlist: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths[4]).unwrap()).unwrap();
        let codes: Vec<_> = masterlist
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["psgcCode"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(codes, ["0100000000", "0102800000", "0102805001"]);
    }

    #[cfg(feature = "compact")]
    #[test]
    fn gzip_output_decodes() {
        use std::io::Read;

        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            out_dir: dir.path().to_path_buf(),
            year: 2023,
            gzip: true,
        };
        let paths = export_json(&loaded(), &options).unwrap();
        assert!(paths[0].to_string_lossy().ends_with("2023-regions.json.gz"));

        let mut text = String::new();
        flate2::read::GzDecoder::new(File::open(&paths[0]).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        let regions: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(regions[0]["name"], "Region I (Ilocos Region)");
    }
}
