//! Umbrella crate: re-exports [`psgc_core`] so the demos can `use psgc_rs::prelude::*`.
pub use psgc_core::*;
