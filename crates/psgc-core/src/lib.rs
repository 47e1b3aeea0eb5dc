// crates/psgc-core/src/lib.rs

//! # psgc-core
//!
//! Philippine Standard Geographic Code (PSGC) ingestion and lookup.
//!
//! The PSA publishes the PSGC as a flat CSV where every row is one
//! geographic unit tagged `Reg`, `Prov`, `City`, `Mun` or `Bgy`. This crate:
//!
//! - parses that file ([`loader::parse`]),
//! - classifies each row and derives its parent codes ([`hierarchy::classify`]),
//! - bulk-loads it into SQLite, one table per level plus a masterlist ([`bulk::load`]),
//! - serves paginated, filtered reads ([`store::LevelStore::list`]).
//!
//! ```rust
//! use psgc_core::prelude::*;
//!
//! # fn main() -> psgc_core::Result<()> {
//! let csv = "10-digit PSGC,Name,Correspondence Code,Geographic Level\n\
//!            1300000000,National Capital Region (NCR),130000000,Reg\n\
//!            1380100000,City of Manila,133900000,City\n";
//! let records = psgc_core::loader::parse_reader(csv.as_bytes())?;
//!
//! let catalog = Catalog::open_in_memory()?;
//! let report = load(&records, &catalog, &LoadOptions::default())?;
//! assert_eq!(report.written, 2);
//!
//! let manila = catalog.city_muni().get_by_code("1380100000")?;
//! assert_eq!(manila.province_code, "1380100000");
//!
//! let page = catalog.regions().list(&PaginationParams::default().with_filter("ncr"))?;
//! assert_eq!(page.metadata.total_items, 1);
//! # Ok(())
//! # }
//! ```

pub mod bulk;
pub mod common;
pub mod config;
pub mod error;
#[cfg(feature = "json")]
pub mod export;
pub mod hierarchy;
pub mod loader;
pub mod logging;
pub mod model;
pub mod query;
pub mod store;
pub mod traits;

// Re-exports
pub use crate::bulk::{load, CancelToken, LoadOptions, LoadProgress, LoadReport, WriteMode};
pub use crate::common::CatalogStats;
pub use crate::config::PsgcConfig;
pub use crate::error::{PsgcError, Result};
pub use crate::hierarchy::{ancestor_code, classify, Classification, Placement};
pub use crate::model::{
    Barangay, CityMuni, CityMuniKind, GeographicRecord, Level, Masterlist, Province, Region,
};
pub use crate::query::{MetaData, Paginated, PaginationParams};
pub use crate::store::{Catalog, LevelStore};
pub use crate::traits::LevelEntity;

pub mod prelude {
    pub use crate::bulk::{load, CancelToken, LoadOptions, LoadReport, WriteMode};
    pub use crate::error::{PsgcError, Result};
    pub use crate::model::{
        Barangay, CityMuni, CityMuniKind, GeographicRecord, Level, Masterlist, Province, Region,
    };
    pub use crate::query::{Paginated, PaginationParams};
    pub use crate::store::{Catalog, LevelStore};
    pub use crate::traits::LevelEntity;
}
