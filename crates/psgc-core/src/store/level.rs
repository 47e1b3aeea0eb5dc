// crates/psgc-core/src/store/level.rs
use super::lock;
use crate::error::{PsgcError, Result};
use crate::model::{CityMuni, CityMuniKind};
use crate::query::{Paginated, PaginationParams};
use crate::traits::LevelEntity;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Read/write access to the table backing `E`.
///
/// Cheap to clone: every store handed out by a
/// [`Catalog`](crate::store::Catalog) shares its connection.
pub struct LevelStore<E> {
    conn: Arc<Mutex<Connection>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for LevelStore<E> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            _entity: PhantomData,
        }
    }
}

impl<E: LevelEntity> LevelStore<E> {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    /// One page of rows ordered by `name`, then `code`.
    ///
    /// A non-empty filter keeps rows where any of [`LevelEntity::FILTER_COLUMNS`]
    /// contains it, ignoring case. `totalItems` counts the filtered rows.
    pub fn list(&self, params: &PaginationParams) -> Result<Paginated<E>> {
        self.list_scoped(None, params)
    }

    fn list_scoped(
        &self,
        scope: Option<(&str, Value)>,
        params: &PaginationParams,
    ) -> Result<Paginated<E>> {
        let params = params.clone().normalized();
        let mut clauses = Vec::new();
        let mut binds: Vec<Value> = Vec::new();

        if let Some((column, value)) = scope {
            clauses.push(format!("{column} = ?"));
            binds.push(value);
        }
        if params.has_filter() {
            // Same fold as the `casefold` SQL function registered on the connection.
            let needle = params.filter.to_lowercase();
            let any = E::FILTER_COLUMNS
                .iter()
                .map(|column| format!("instr(casefold({column}), ?) > 0"))
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("({any})"));
            binds.extend(E::FILTER_COLUMNS.iter().map(|_| Value::Text(needle.clone())));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let conn = lock(&self.conn)?;
        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}{where_sql}", E::TABLE),
            params_from_iter(binds.iter()),
            |row| row.get(0),
        )?;

        binds.push(Value::Integer(i64::from(params.limit())));
        binds.push(Value::Integer(
            i64::try_from(params.offset()).unwrap_or(i64::MAX),
        ));
        let sql = format!(
            "SELECT {} FROM {}{where_sql} ORDER BY name ASC, code ASC LIMIT ? OFFSET ?",
            E::COLUMNS.join(", "),
            E::TABLE,
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let data = stmt
            .query_map(params_from_iter(binds.iter()), |row| E::from_row(row))?
            .collect::<rusqlite::Result<Vec<E>>>()?;

        debug!(
            table = E::TABLE,
            page = params.page,
            per_page = params.per_page,
            filter = %params.filter,
            total,
            returned = data.len(),
            "listed"
        );
        Ok(Paginated::new(&params, total.max(0) as u64, data))
    }

    /// Exact match on `code`.
    pub fn get_by_code(&self, code: &str) -> Result<E> {
        let code = code.trim();
        let sql = format!(
            "SELECT {} FROM {} WHERE code = ?1",
            E::COLUMNS.join(", "),
            E::TABLE
        );
        let conn = lock(&self.conn)?;
        conn.query_row(&sql, [code], |row| E::from_row(row))
            .optional()?
            .ok_or_else(|| PsgcError::NotFound {
                level: E::LABEL,
                code: code.to_string(),
            })
    }

    pub fn count(&self) -> Result<u64> {
        let conn = lock(&self.conn)?;
        count_rows(&conn, E::TABLE)
    }

    /// Every row ordered by `code`. Used by the JSON export.
    pub fn all_by_code(&self) -> Result<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY code ASC",
            E::COLUMNS.join(", "),
            E::TABLE
        );
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| E::from_row(row))?
            .collect::<rusqlite::Result<Vec<E>>>()?;
        Ok(rows)
    }

    /// Upserts one row (`INSERT OR REPLACE`).
    pub fn create(&self, entity: &E) -> Result<()> {
        let conn = lock(&self.conn)?;
        insert(&conn, entity).map_err(|source| PsgcError::Persistence {
            code: entity.code().to_string(),
            source,
        })
    }

    /// Upserts `entities` in one transaction: all of them or none.
    pub fn create_batch(&self, entities: &[E]) -> Result<()> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        for entity in entities {
            insert(&tx, entity).map_err(|source| PsgcError::Persistence {
                code: entity.code().to_string(),
                source,
            })?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl LevelStore<CityMuni> {
    /// Like [`LevelStore::list`], restricted to cities or to municipalities.
    pub fn list_kind(
        &self,
        kind: CityMuniKind,
        params: &PaginationParams,
    ) -> Result<Paginated<CityMuni>> {
        self.list_scoped(Some(("level", Value::Text(kind.tag().to_string()))), params)
    }

    /// Like [`LevelStore::get_by_code`], but a row of the other kind is a miss.
    pub fn get_by_code_kind(&self, kind: CityMuniKind, code: &str) -> Result<CityMuni> {
        match self.get_by_code(code) {
            Ok(found) if found.level == kind => Ok(found),
            Ok(_) | Err(PsgcError::NotFound { .. }) => Err(PsgcError::NotFound {
                level: kind.label(),
                code: code.trim().to_string(),
            }),
            Err(other) => Err(other),
        }
    }
}

pub(crate) fn insert<E: LevelEntity>(conn: &Connection, entity: &E) -> rusqlite::Result<()> {
    let placeholders = (1..=E::COLUMNS.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({placeholders})",
        E::TABLE,
        E::COLUMNS.join(", ")
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    stmt.execute(entity.to_params().as_slice())?;
    Ok(())
}

pub(crate) fn count_rows(conn: &Connection, table: &str) -> Result<u64> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(n.max(0) as u64)
}
