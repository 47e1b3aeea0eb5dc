// crates/psgc-core/src/traits.rs
use rusqlite::types::ToSql;
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A row type stored in one PSGC table.
///
/// This is the single seam between the generic [`LevelStore`](crate::store::LevelStore)
/// and the five concrete tables. Implementors describe *where* they live and
/// *which* columns participate in keyword filtering; the store supplies the
/// SQL, pagination and lookup logic once for all of them.
///
/// `COLUMNS` is both the `SELECT` list and the `INSERT` column order, so
/// [`LevelEntity::to_params`] must yield values in exactly that order.
///
/// # Examples
/// ```rust
/// use psgc_core::model::Region;
/// use psgc_core::traits::LevelEntity;
///
/// assert_eq!(Region::TABLE, "region");
/// assert_eq!(Region::COLUMNS, &["code", "name"]);
/// ```
pub trait LevelEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table name. Also used verbatim in generated SQL, so it must be a plain identifier.
    const TABLE: &'static str;

    /// Human readable label used in `NotFound` errors and logs.
    const LABEL: &'static str;

    /// Selected/inserted columns, `code` first.
    const COLUMNS: &'static [&'static str];

    /// Columns matched (case-insensitively, by substring) against a keyword filter.
    const FILTER_COLUMNS: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Bind values in [`LevelEntity::COLUMNS`] order.
    fn to_params(&self) -> Vec<&dyn ToSql>;

    fn code(&self) -> &str;

    fn name(&self) -> &str;
}
