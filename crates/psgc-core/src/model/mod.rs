// crates/psgc-core/src/model/mod.rs
pub mod entity;
pub mod level;
pub mod record;

pub use entity::{Barangay, CityMuni, LevelRow, Masterlist, Province, Region};
pub use level::{CityMuniKind, Level, CODE_WIDTH};
pub use record::{GeographicRecord, REQUIRED_HEADERS};
