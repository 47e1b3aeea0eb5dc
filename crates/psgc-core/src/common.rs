// crates/psgc-core/src/common.rs
use serde::{Deserialize, Serialize};

/// Row counts per table.
///
/// Returned by [`Catalog::stats`](crate::store::Catalog::stats); the numbers
/// reflect whatever the last load committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub regions: u64,
    pub provinces: u64,
    pub city_muni: u64,
    pub cities: u64,
    pub municipalities: u64,
    pub barangays: u64,
    pub masterlist: u64,
}

impl CatalogStats {
    /// Records sitting in one of the four level tables.
    pub fn classified(&self) -> u64 {
        self.regions + self.provinces + self.city_muni + self.barangays
    }
}
