// crates/psgc-core/src/store/schema.rs

//! Storage bootstrap. Every statement is `IF NOT EXISTS`, so running it
//! against an already populated file is a no-op.

use crate::error::{PsgcError, Result};
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

/// Tables in dependency order (parents first).
pub const TABLES: [&str; 5] = ["region", "province", "city_muni", "barangay", "masterlist"];

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS region (
        code TEXT PRIMARY KEY,
        name TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS province (
        code TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        region_code TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS city_muni (
        code TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        level TEXT NOT NULL CHECK (level IN ('City', 'Mun')),
        province_code TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS barangay (
        code TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        city_muni_code TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS masterlist (
        code TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        correspondence_code TEXT NOT NULL,
        level TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_region_name ON region(name, code);
    CREATE INDEX IF NOT EXISTS idx_province_name ON province(name, code);
    CREATE INDEX IF NOT EXISTS idx_province_region ON province(region_code);
    CREATE INDEX IF NOT EXISTS idx_city_muni_name ON city_muni(name, code);
    CREATE INDEX IF NOT EXISTS idx_city_muni_province ON city_muni(province_code);
    CREATE INDEX IF NOT EXISTS idx_barangay_name ON barangay(name, code);
    CREATE INDEX IF NOT EXISTS idx_barangay_city_muni ON barangay(city_muni_code);
    CREATE INDEX IF NOT EXISTS idx_masterlist_name ON masterlist(name, code);
";

/// Creates the four level tables plus `masterlist`.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    debug!(tables = TABLES.len(), "schema ready");
    Ok(())
}

/// Deletes every row, children first. Callers wrap this in the load transaction.
pub fn clear(conn: &Connection) -> Result<()> {
    for table in TABLES.iter().rev() {
        conn.execute(&format!("DELETE FROM {table}"), [])?;
    }
    Ok(())
}

/// Fails with [`PsgcError::MissingTable`] naming the first table that is absent.
pub fn verify(conn: &Connection) -> Result<()> {
    for table in TABLES {
        let found: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .optional()?;
        if found.is_none() {
            return Err(PsgcError::MissingTable(table));
        }
    }
    Ok(())
}
