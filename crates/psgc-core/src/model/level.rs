// crates/psgc-core/src/model/level.rs
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of a PSGC code in digits.
pub const CODE_WIDTH: usize = 10;

/// Depth of a geographic unit in the PSGC hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    Region,
    Province,
    CityMuni,
    Barangay,
}

impl Level {
    pub const ALL: [Level; 4] = [
        Level::Region,
        Level::Province,
        Level::CityMuni,
        Level::Barangay,
    ];

    /// Number of leading digits that identify a unit at this level.
    pub const fn boundary(self) -> usize {
        match self {
            Level::Region => 2,
            Level::Province => 5,
            Level::CityMuni => 7,
            Level::Barangay => CODE_WIDTH,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Region => "region",
            Level::Province => "province",
            Level::CityMuni => "city-muni",
            Level::Barangay => "barangay",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two source tags that share the city/municipality table.
///
/// Serialized with the source spelling (`City`, `Mun`) so API consumers see
/// the same tag the PSA publication uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CityMuniKind {
    City,
    Mun,
}

impl CityMuniKind {
    pub const fn tag(self) -> &'static str {
        match self {
            CityMuniKind::City => "City",
            CityMuniKind::Mun => "Mun",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CityMuniKind::City => "city",
            CityMuniKind::Mun => "municipality",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "City" => Some(CityMuniKind::City),
            "Mun" => Some(CityMuniKind::Mun),
            _ => None,
        }
    }
}

impl fmt::Display for CityMuniKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl ToSql for CityMuniKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.tag()))
    }
}

impl FromSql for CityMuniKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let tag = value.as_str()?;
        CityMuniKind::from_tag(tag)
            .ok_or_else(|| FromSqlError::Other(format!("unknown city/municipality tag {tag:?}").into()))
    }
}
