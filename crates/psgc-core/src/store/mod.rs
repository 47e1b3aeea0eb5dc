// crates/psgc-core/src/store/mod.rs

//! # Level Stores
//!
//! One SQLite file holds the four level tables plus `masterlist`. A
//! [`Catalog`] owns the connection and hands out typed [`LevelStore`]s that
//! share it.
//!
//! Filtering goes through a `casefold` scalar function registered on the
//! connection, so matching uses full Unicode lowercasing instead of SQLite's
//! ASCII-only `lower()`.

use crate::common::CatalogStats;
use crate::config::DatabaseConfig;
use crate::error::{PsgcError, Result};
use crate::model::{Barangay, CityMuni, CityMuniKind, Masterlist, Province, Region};
use crate::traits::LevelEntity;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

mod level;
pub mod schema;

pub use level::LevelStore;
pub(crate) use level::insert;

/// Handle to the PSGC database.
///
/// Clones share one connection behind a mutex, so any number of threads may
/// query through the same catalog. Statements run one at a time; a caller
/// waits for the lock rather than failing.
#[derive(Clone)]
pub struct Catalog {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").finish_non_exhaustive()
    }
}

impl Catalog {
    /// Opens (creating if needed) the database at `path` and bootstraps the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| PsgcError::io(parent.display().to_string(), e))?;
        }
        let conn = Connection::open(path)?;
        let catalog = Self::prepare(conn)?;
        catalog.with_conn(|conn| schema::migrate(conn))?;
        info!(path = %path.display(), "opened PSGC database");
        Ok(catalog)
    }

    /// Opens an already populated database without touching the schema.
    ///
    /// Fails with [`PsgcError::MissingTable`] when the file was never loaded.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let catalog = Self::prepare(conn)?;
        catalog.with_conn(|conn| schema::verify(conn))?;
        info!(path = %path.display(), "opened existing PSGC database");
        Ok(catalog)
    }

    /// A private in-memory database with the schema in place.
    pub fn open_in_memory() -> Result<Self> {
        let catalog = Self::prepare(Connection::open_in_memory()?)?;
        catalog.with_conn(|conn| schema::migrate(conn))?;
        Ok(catalog)
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::open(&config.path)
    }

    fn prepare(conn: Connection) -> Result<Self> {
        // In-memory databases answer "memory" here.
        let journal: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.create_scalar_function(
            "casefold",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| t.to_lowercase()))
            },
        )?;
        debug!(%journal, "connection prepared");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn level<E: LevelEntity>(&self) -> LevelStore<E> {
        LevelStore::new(Arc::clone(&self.conn))
    }

    pub fn regions(&self) -> LevelStore<Region> {
        self.level()
    }

    pub fn provinces(&self) -> LevelStore<Province> {
        self.level()
    }

    pub fn city_muni(&self) -> LevelStore<CityMuni> {
        self.level()
    }

    pub fn barangays(&self) -> LevelStore<Barangay> {
        self.level()
    }

    pub fn masterlist(&self) -> LevelStore<Masterlist> {
        self.level()
    }

    pub fn stats(&self) -> Result<CatalogStats> {
        self.with_conn(|conn| {
            let kind = |kind: CityMuniKind| -> Result<u64> {
                let n: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM city_muni WHERE level = ?1",
                    [kind],
                    |row| row.get(0),
                )?;
                Ok(n.max(0) as u64)
            };
            Ok(CatalogStats {
                regions: level::count_rows(conn, Region::TABLE)?,
                provinces: level::count_rows(conn, Province::TABLE)?,
                city_muni: level::count_rows(conn, CityMuni::TABLE)?,
                cities: kind(CityMuniKind::City)?,
                municipalities: kind(CityMuniKind::Mun)?,
                barangays: level::count_rows(conn, Barangay::TABLE)?,
                masterlist: level::count_rows(conn, Masterlist::TABLE)?,
            })
        })
    }

    /// Deletes every row from every table.
    pub fn reset(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            schema::clear(&tx)?;
            tx.commit()?;
            Ok(())
        })
    }

    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = lock(&self.conn)?;
        f(&conn)
    }

    pub(crate) fn with_conn_mut<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let mut conn = lock(&self.conn)?;
        f(&mut conn)
    }
}

pub(crate) fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| PsgcError::Poisoned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PaginationParams;

    fn region(code: &str, name: &str) -> Region {
        Region {
            code: code.into(),
            name: name.into(),
        }
    }

    fn city(code: &str, name: &str, kind: CityMuniKind) -> CityMuni {
        CityMuni {
            code: code.into(),
            name: name.into(),
            level: kind,
            province_code: "0102800000".into(),
        }
    }

    #[test]
    fn list_orders_by_name_then_code() {
        let catalog = Catalog::open_in_memory().unwrap();
        let store = catalog.regions();
        store
            .create_batch(&[
                region("0300000000", "Region III (Central Luzon)"),
                region("0100000000", "Region I (Ilocos Region)"),
                region("0200000000", "Region II (Cagayan Valley)"),
            ])
            .unwrap();
        let page = store.list(&PaginationParams::default()).unwrap();
        let codes: Vec<_> = page.data.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["0100000000", "0200000000", "0300000000"]);
        assert_eq!(page.metadata.total_items, 3);
        assert_eq!(page.metadata.total_pages, 1);
    }

    #[test]
    fn filter_folds_non_ascii_case() {
        let catalog = Catalog::open_in_memory().unwrap();
        let store = catalog.city_muni();
        store
            .create(&city("0102801000", "PARAÑAQUE", CityMuniKind::City))
            .unwrap();
        let page = store
            .list(&PaginationParams::default().with_filter("parañaque"))
            .unwrap();
        assert_eq!(page.data.len(), 1);
    }

    #[test]
    fn filter_matches_code_substring() {
        let catalog = Catalog::open_in_memory().unwrap();
        let store = catalog.regions();
        store.create(&region("1300000000", "NCR")).unwrap();
        store.create(&region("0100000000", "Ilocos")).unwrap();
        let page = store
            .list(&PaginationParams::default().with_filter("130"))
            .unwrap();
        assert_eq!(page.data, vec![region("1300000000", "NCR")]);
        assert_eq!(page.metadata.total_items, 1);
    }

    #[test]
    fn missing_code_is_not_found() {
        let catalog = Catalog::open_in_memory().unwrap();
        let err = catalog.provinces().get_by_code("9999999999").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "province 9999999999 not found");
    }

    #[test]
    fn kind_views_partition_city_muni() {
        let catalog = Catalog::open_in_memory().unwrap();
        let store = catalog.city_muni();
        store
            .create_batch(&[
                city("0102805000", "City of Batac", CityMuniKind::City),
                city("0102801000", "Adams", CityMuniKind::Mun),
            ])
            .unwrap();
        let cities = store
            .list_kind(CityMuniKind::City, &PaginationParams::default())
            .unwrap();
        assert_eq!(cities.data.len(), 1);
        assert_eq!(cities.metadata.total_items, 1);
        assert!(store
            .get_by_code_kind(CityMuniKind::Mun, "0102805000")
            .unwrap_err()
            .is_not_found());
        assert_eq!(
            store
                .get_by_code_kind(CityMuniKind::Mun, "0102801000")
                .unwrap()
                .name,
            "Adams"
        );

        let stats = catalog.stats().unwrap();
        assert_eq!((stats.city_muni, stats.cities, stats.municipalities), (2, 1, 1));
    }

    #[test]
    fn failed_batch_leaves_table_untouched() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog
            .with_conn(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER reject_bad BEFORE INSERT ON region
                     WHEN NEW.name = 'bad' BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
                )?;
                Ok(())
            })
            .unwrap();
        let err = catalog
            .regions()
            .create_batch(&[region("0100000000", "ok"), region("0200000000", "bad")])
            .unwrap_err();
        assert!(matches!(err, PsgcError::Persistence { ref code, .. } if code == "0200000000"));
        assert_eq!(catalog.regions().count().unwrap(), 0);
    }

    #[test]
    fn open_existing_requires_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("PRAGMA user_version = 1;")
            .unwrap();
        assert!(matches!(
            Catalog::open_existing(&path),
            Err(PsgcError::MissingTable("region"))
        ));

        Catalog::open(&path).unwrap();
        Catalog::open_existing(&path).unwrap();
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/db/psgc.db");
        let catalog = Catalog::open(&path).unwrap();
        catalog.regions().create(&region("0100000000", "Ilocos")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn dropped_table_is_a_storage_error() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog
            .with_conn(|conn| {
                conn.execute_batch("DROP TABLE barangay;")?;
                Ok(())
            })
            .unwrap();
        let err = catalog
            .barangays()
            .list(&PaginationParams::default())
            .unwrap_err();
        assert!(matches!(err, PsgcError::Storage(_)), "{err:?}");
        assert!(err.to_string().contains("no such table: barangay"), "{err}");
        assert!(!err.is_not_found());
    }

    #[test]
    fn clones_serve_concurrent_readers() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog
            .regions()
            .create_batch(&[region("0100000000", "Ilocos"), region("0200000000", "Cagayan Valley")])
            .unwrap();
        let readers: Vec<_> = (0..8)
            .map(|_| {
                let catalog = catalog.clone();
                std::thread::spawn(move || {
                    catalog
                        .regions()
                        .list(&PaginationParams::default())
                        .map(|page| page.metadata.total_items)
                })
            })
            .collect();
        for reader in readers {
            assert_eq!(reader.join().unwrap().unwrap(), 2);
        }
    }

    #[test]
    fn from_config_opens_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("cfg/psgc.db"),
        };
        let catalog = Catalog::from_config(&config).unwrap();
        assert_eq!(catalog.stats().unwrap(), CatalogStats::default());
        assert!(config.path.exists());
    }

    #[test]
    fn reset_clears_all_tables() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.regions().create(&region("0100000000", "Ilocos")).unwrap();
        catalog.reset().unwrap();
        assert_eq!(catalog.stats().unwrap(), CatalogStats::default());
    }
}
