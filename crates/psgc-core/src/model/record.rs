// crates/psgc-core/src/model/record.rs
use serde::{Deserialize, Serialize};

/// One row of the PSA publication datafile, exactly as parsed.
///
/// Columns are bound by header name, so the distribution may reorder them or
/// carry extra columns (population, income class, ...) without breaking the
/// ingestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographicRecord {
    #[serde(rename = "10-digit PSGC")]
    pub code: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Correspondence Code")]
    pub correspondence_code: String,
    /// Raw level tag: `Reg`, `Prov`, `City`, `Mun`, `Bgy`, or anything else.
    #[serde(rename = "Geographic Level")]
    pub level: String,
}

impl GeographicRecord {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        correspondence_code: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            correspondence_code: correspondence_code.into(),
            level: level.into(),
        }
    }
}

/// Header names the ingestor requires to be present.
pub const REQUIRED_HEADERS: [&str; 4] = [
    "10-digit PSGC",
    "Name",
    "Correspondence Code",
    "Geographic Level",
];
