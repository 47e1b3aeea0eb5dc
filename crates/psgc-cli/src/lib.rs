//! psgc-cli
//! ========
//!
//! Command-line interface for the `psgc-core` catalog.
//!
//! The binary (`psgc`) is the primary deliverable; the library target only
//! exposes the argument definitions so they are documented and testable.
//!
//! Basic usage
//! -----------
//!
//! ```text
//! psgc generate --file files/csv/psgc_2023.csv
//! psgc stats
//! psgc list regions
//! psgc list barangays --filter poblacion --per-page 20
//! psgc get provinces 0102800000
//! psgc export --out files/json --gzip
//! PORT=8080 psgc serve
//! ```
//!
//! Settings come from built-in defaults, then `--config psgc.toml`, then the
//! `PORT`, `PSGC_DB` and `ENV` environment variables, then flags.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod args;
