// crates/psgc-core/src/model/entity.rs
use super::level::{CityMuniKind, Level};
use super::record::GeographicRecord;
use crate::hierarchy::{Classification, Placement};
use crate::traits::LevelEntity;
use rusqlite::types::ToSql;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// A region (`Reg`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub code: String,
    pub name: String,
}

/// A province (`Prov`), linked to its region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Province {
    pub code: String,
    pub name: String,
    pub region_code: String,
}

/// A city (`City`) or municipality (`Mun`), linked to its province.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityMuni {
    pub code: String,
    pub name: String,
    pub level: CityMuniKind,
    pub province_code: String,
}

/// A barangay (`Bgy`), linked to its city or municipality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barangay {
    pub code: String,
    pub name: String,
    pub city_muni_code: String,
}

/// The unfiltered superset: one row per ingested record, tag kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Masterlist {
    pub code: String,
    pub name: String,
    pub correspondence_code: String,
    pub level: String,
}

impl From<&GeographicRecord> for Masterlist {
    fn from(record: &GeographicRecord) -> Self {
        Self {
            code: record.code.clone(),
            name: record.name.clone(),
            correspondence_code: record.correspondence_code.clone(),
            level: record.level.clone(),
        }
    }
}

/// The per-level row a classified record turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelRow {
    Region(Region),
    Province(Province),
    CityMuni(CityMuni),
    Barangay(Barangay),
}

impl LevelRow {
    /// Builds the level row for `record`, or `None` when it only belongs in the masterlist.
    pub fn from_classified(record: &GeographicRecord, class: &Classification) -> Option<Self> {
        let code = record.code.clone();
        let name = record.name.clone();
        let ancestors = &class.ancestors;
        let row = match class.placement {
            Placement::Region => LevelRow::Region(Region { code, name }),
            Placement::Province => LevelRow::Province(Province {
                code,
                name,
                region_code: ancestors.region.clone()?,
            }),
            Placement::CityMuni(kind) => LevelRow::CityMuni(CityMuni {
                code,
                name,
                level: kind,
                province_code: ancestors.province.clone()?,
            }),
            Placement::Barangay => LevelRow::Barangay(Barangay {
                code,
                name,
                city_muni_code: ancestors.city_muni.clone()?,
            }),
            Placement::Unclassified => return None,
        };
        Some(row)
    }

    pub fn level(&self) -> Level {
        match self {
            LevelRow::Region(_) => Level::Region,
            LevelRow::Province(_) => Level::Province,
            LevelRow::CityMuni(_) => Level::CityMuni,
            LevelRow::Barangay(_) => Level::Barangay,
        }
    }
}

// -----------------------------------------------------------------------------
// TABLE BINDINGS
// -----------------------------------------------------------------------------

impl LevelEntity for Region {
    const TABLE: &'static str = "region";
    const LABEL: &'static str = "region";
    const COLUMNS: &'static [&'static str] = &["code", "name"];
    const FILTER_COLUMNS: &'static [&'static str] = &["code", "name"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get("code")?,
            name: row.get("name")?,
        })
    }

    fn to_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.code, &self.name]
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl LevelEntity for Province {
    const TABLE: &'static str = "province";
    const LABEL: &'static str = "province";
    const COLUMNS: &'static [&'static str] = &["code", "name", "region_code"];
    const FILTER_COLUMNS: &'static [&'static str] = &["code", "name"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get("code")?,
            name: row.get("name")?,
            region_code: row.get("region_code")?,
        })
    }

    fn to_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.code, &self.name, &self.region_code]
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl LevelEntity for CityMuni {
    const TABLE: &'static str = "city_muni";
    const LABEL: &'static str = "city/municipality";
    const COLUMNS: &'static [&'static str] = &["code", "name", "level", "province_code"];
    const FILTER_COLUMNS: &'static [&'static str] = &["code", "name"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get("code")?,
            name: row.get("name")?,
            level: row.get("level")?,
            province_code: row.get("province_code")?,
        })
    }

    fn to_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.code, &self.name, &self.level, &self.province_code]
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl LevelEntity for Barangay {
    const TABLE: &'static str = "barangay";
    const LABEL: &'static str = "barangay";
    const COLUMNS: &'static [&'static str] = &["code", "name", "city_muni_code"];
    const FILTER_COLUMNS: &'static [&'static str] = &["code", "name"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get("code")?,
            name: row.get("name")?,
            city_muni_code: row.get("city_muni_code")?,
        })
    }

    fn to_params(&self) -> Vec<&dyn ToSql> {
        vec![&self.code, &self.name, &self.city_muni_code]
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl LevelEntity for Masterlist {
    const TABLE: &'static str = "masterlist";
    const LABEL: &'static str = "masterlist entry";
    const COLUMNS: &'static [&'static str] = &["code", "name", "correspondence_code", "level"];
    const FILTER_COLUMNS: &'static [&'static str] = &["code", "name", "correspondence_code"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get("code")?,
            name: row.get("name")?,
            correspondence_code: row.get("correspondence_code")?,
            level: row.get("level")?,
        })
    }

    fn to_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.code,
            &self.name,
            &self.correspondence_code,
            &self.level,
        ]
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }
}
