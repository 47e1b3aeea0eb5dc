// crates/psgc-core/src/bulk.rs

//! # Bulk Loader
//!
//! Writes an ingested record set into the catalog: every record into
//! `masterlist`, classified records also into their level table.
//!
//! Records are deduplicated by code first (the last occurrence wins, at its
//! own position), then written by a single writer in input order. In
//! [`WriteMode::Transactional`] each batch is one SQLite transaction; with no
//! batch size the whole load is one transaction and therefore atomic.
//!
//! Cancellation and the deadline are checked between batches only; a batch
//! that has started always finishes or rolls back.

use crate::config::LoadConfig;
use crate::error::{PsgcError, Result};
use crate::hierarchy::{classify, is_consistent};
use crate::model::{GeographicRecord, Level, LevelRow, Masterlist};
use crate::store::{insert, schema, Catalog};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

// -----------------------------------------------------------------------------
// OPTIONS
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// A failing record rolls back its whole batch and aborts the load.
    #[default]
    Transactional,
    /// Every record is attempted on its own; the first failure is returned
    /// after all attempts and successful writes stay.
    BestEffort,
}

/// Cooperative stop signal shared between the caller and a running load.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Reported after each committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub batches: usize,
    pub written: usize,
    pub total: usize,
}

pub type ProgressFn = Arc<dyn Fn(LoadProgress) + Send + Sync>;

#[derive(Clone, Default)]
pub struct LoadOptions {
    pub mode: WriteMode,
    /// Records per batch; `None` (or 0) means a single batch.
    pub batch_size: Option<usize>,
    /// Delete existing rows inside the first batch.
    pub reset: bool,
    pub cancel: Option<CancelToken>,
    pub deadline: Option<Instant>,
    pub progress: Option<ProgressFn>,
}

impl std::fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadOptions")
            .field("mode", &self.mode)
            .field("batch_size", &self.batch_size)
            .field("reset", &self.reset)
            .field("cancel", &self.cancel)
            .field("deadline", &self.deadline)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_progress(mut self, progress: impl Fn(LoadProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    fn stop_reason(&self) -> Option<Stop> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Some(Stop::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(Stop::Deadline);
        }
        None
    }
}

impl From<&LoadConfig> for LoadOptions {
    fn from(config: &LoadConfig) -> Self {
        Self {
            mode: if config.best_effort {
                WriteMode::BestEffort
            } else {
                WriteMode::Transactional
            },
            batch_size: config.batch_size,
            reset: config.reset,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stop {
    Cancelled,
    Deadline,
}

// -----------------------------------------------------------------------------
// REPORT
// -----------------------------------------------------------------------------

/// What a load did. Level counts cover committed rows only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub total_input: usize,
    pub written: usize,
    /// Input rows superseded by a later row with the same code.
    pub duplicates: usize,
    pub regions: usize,
    pub provinces: usize,
    pub city_muni: usize,
    pub barangays: usize,
    /// Masterlist-only rows.
    pub unclassified: usize,
    /// Rows whose tag disagrees with their code's digit structure.
    pub inconsistent: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub deadline_exceeded: bool,
}

impl LoadReport {
    fn count(&mut self, item: &Prepared<'_>) {
        self.written += 1;
        match item.row.as_ref().map(LevelRow::level) {
            Some(Level::Region) => self.regions += 1,
            Some(Level::Province) => self.provinces += 1,
            Some(Level::CityMuni) => self.city_muni += 1,
            Some(Level::Barangay) => self.barangays += 1,
            None => self.unclassified += 1,
        }
    }

    fn stop(&mut self, reason: Stop) {
        match reason {
            Stop::Cancelled => self.cancelled = true,
            Stop::Deadline => self.deadline_exceeded = true,
        }
    }

    /// `true` when every unique record was written.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && !self.deadline_exceeded && self.failed == 0
    }
}

// -----------------------------------------------------------------------------
// LOAD
// -----------------------------------------------------------------------------

struct Prepared<'a> {
    record: &'a GeographicRecord,
    row: Option<LevelRow>,
}

/// Writes `records` into `catalog`.
///
/// # Errors
/// Transactional mode returns the first failure immediately (its batch is
/// rolled back). Best-effort mode returns the first failure after every
/// record was attempted.
pub fn load(
    records: &[GeographicRecord],
    catalog: &Catalog,
    options: &LoadOptions,
) -> Result<LoadReport> {
    let mut report = LoadReport {
        total_input: records.len(),
        ..LoadReport::default()
    };
    let prepared = prepare(records, &mut report);
    info!(
        input = report.total_input,
        unique = prepared.len(),
        duplicates = report.duplicates,
        inconsistent = report.inconsistent,
        mode = ?options.mode,
        "loading PSGC records"
    );

    if prepared.is_empty() && options.reset && options.stop_reason().is_none() {
        catalog.reset()?;
    }

    let batch_size = options
        .batch_size
        .filter(|n| *n > 0)
        .unwrap_or(prepared.len())
        .max(1);
    let mut first_error: Option<PsgcError> = None;

    for (index, chunk) in prepared.chunks(batch_size).enumerate() {
        if let Some(reason) = options.stop_reason() {
            warn!(?reason, written = report.written, "load stopped early");
            report.stop(reason);
            break;
        }
        let reset = options.reset && index == 0;

        match options.mode {
            WriteMode::Transactional => {
                catalog.with_conn_mut(|conn| write_batch(conn, chunk, reset))?;
                for item in chunk {
                    report.count(item);
                }
            }
            WriteMode::BestEffort => {
                if reset {
                    catalog.reset()?;
                }
                for item in chunk {
                    match catalog.with_conn_mut(|conn| write_batch(conn, std::slice::from_ref(item), false)) {
                        Ok(()) => report.count(item),
                        Err(err) => {
                            warn!(code = %item.record.code, error = %err, "record not written");
                            report.failed += 1;
                            first_error.get_or_insert(err);
                        }
                    }
                }
            }
        }

        debug!(batch = index + 1, size = chunk.len(), written = report.written, "batch committed");
        if let Some(progress) = &options.progress {
            progress(LoadProgress {
                batches: index + 1,
                written: report.written,
                total: prepared.len(),
            });
        }
    }

    if let Some(err) = first_error {
        warn!(failed = report.failed, written = report.written, "load finished with failures");
        return Err(err);
    }
    info!(
        written = report.written,
        regions = report.regions,
        provinces = report.provinces,
        city_muni = report.city_muni,
        barangays = report.barangays,
        unclassified = report.unclassified,
        "load finished"
    );
    Ok(report)
}

/// Dedups keep-last and classifies.
fn prepare<'a>(records: &'a [GeographicRecord], report: &mut LoadReport) -> Vec<Prepared<'a>> {
    let mut last: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        last.insert(record.code.as_str(), i);
    }
    report.duplicates = records.len() - last.len();

    records
        .iter()
        .enumerate()
        .filter(|(i, record)| last.get(record.code.as_str()) == Some(i))
        .map(|(_, record)| {
            let class = classify(record);
            if let Some(level) = class.level() {
                if !is_consistent(&record.code, level) {
                    report.inconsistent += 1;
                    warn!(code = %record.code, tag = %record.level, %level, "tag disagrees with code structure");
                }
            }
            Prepared {
                record,
                row: LevelRow::from_classified(record, &class),
            }
        })
        .collect()
}

fn write_batch(conn: &mut Connection, chunk: &[Prepared<'_>], reset: bool) -> Result<()> {
    let tx = conn.transaction()?;
    if reset {
        schema::clear(&tx)?;
    }
    for item in chunk {
        write_one(&tx, item)?;
    }
    tx.commit()?;
    Ok(())
}

fn write_one(conn: &Connection, item: &Prepared<'_>) -> Result<()> {
    let persist = |source| PsgcError::Persistence {
        code: item.record.code.clone(),
        source,
    };
    insert(conn, &Masterlist::from(item.record)).map_err(persist)?;
    let written = match &item.row {
        Some(LevelRow::Region(row)) => insert(conn, row),
        Some(LevelRow::Province(row)) => insert(conn, row),
        Some(LevelRow::CityMuni(row)) => insert(conn, row),
        Some(LevelRow::Barangay(row)) => insert(conn, row),
        None => Ok(()),
    };
    written.map_err(persist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PaginationParams;
    use std::time::Duration;

    fn rec(code: &str, name: &str, level: &str) -> GeographicRecord {
        GeographicRecord::new(code, name, "", level)
    }

    fn sample() -> Vec<GeographicRecord> {
        vec![
            rec("0100000000", "Region I (Ilocos Region)", "Reg"),
            rec("0102800000", "Ilocos Norte", "Prov"),
            rec("0102805000", "City of Batac", "City"),
            rec("0102801000", "Adams", "Mun"),
            rec("0102805001", "Aglipay (Pob.)", "Bgy"),
            rec("1999901000", "Pahamuddin", ""),
        ]
    }

    fn reject_name(catalog: &Catalog, name: &str) {
        catalog
            .with_conn(|conn| {
                conn.execute_batch(&format!(
                    "CREATE TRIGGER reject_row BEFORE INSERT ON masterlist
                     WHEN NEW.name = '{name}' BEGIN SELECT RAISE(ABORT, 'rejected'); END;"
                ))?;
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn every_record_lands_in_masterlist_and_one_level() {
        let catalog = Catalog::open_in_memory().unwrap();
        let report = load(&sample(), &catalog, &LoadOptions::new()).unwrap();
        assert_eq!(report.written, 6);
        assert_eq!(
            (report.regions, report.provinces, report.city_muni, report.barangays, report.unclassified),
            (1, 1, 2, 1, 1)
        );
        let stats = catalog.stats().unwrap();
        assert_eq!(stats.masterlist, 6);
        assert_eq!(stats.classified(), 5);
        assert!(report.is_complete());
    }

    #[test]
    fn duplicate_codes_keep_the_last_row() {
        let catalog = Catalog::open_in_memory().unwrap();
        let records = vec![
            rec("0100000000", "First", "Reg"),
            rec("0100000000", "Second", "Reg"),
        ];
        let report = load(&records, &catalog, &LoadOptions::new()).unwrap();
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.written, 1);
        assert_eq!(catalog.regions().get_by_code("0100000000").unwrap().name, "Second");
    }

    #[test]
    fn failing_record_rolls_back_the_whole_load() {
        let catalog = Catalog::open_in_memory().unwrap();
        reject_name(&catalog, "Adams");
        let err = load(&sample(), &catalog, &LoadOptions::new()).unwrap_err();
        assert!(matches!(err, PsgcError::Persistence { ref code, .. } if code == "0102801000"));
        assert_eq!(catalog.stats().unwrap().masterlist, 0);
        assert_eq!(catalog.regions().count().unwrap(), 0);
    }

    #[test]
    fn failure_only_rolls_back_its_own_batch() {
        let catalog = Catalog::open_in_memory().unwrap();
        reject_name(&catalog, "Adams");
        let options = LoadOptions::new().with_batch_size(2);
        assert!(load(&sample(), &catalog, &options).is_err());
        // Batch 1 (region, province) committed, batch 2 (Batac, Adams) did not.
        assert_eq!(catalog.stats().unwrap().masterlist, 2);
        assert!(catalog.city_muni().get_by_code("0102805000").unwrap_err().is_not_found());
    }

    #[test]
    fn best_effort_writes_everything_else() {
        let catalog = Catalog::open_in_memory().unwrap();
        reject_name(&catalog, "Adams");
        let options = LoadOptions::new().with_mode(WriteMode::BestEffort);
        let err = load(&sample(), &catalog, &options).unwrap_err();
        assert!(matches!(err, PsgcError::Persistence { ref code, .. } if code == "0102801000"));
        let stats = catalog.stats().unwrap();
        assert_eq!(stats.masterlist, 5);
        assert_eq!(stats.municipalities, 0);
        assert_eq!(stats.barangays, 1);
    }

    #[test]
    fn cancel_between_batches() {
        let catalog = Catalog::open_in_memory().unwrap();
        let token = CancelToken::new();
        let trigger = token.clone();
        let options = LoadOptions::new()
            .with_batch_size(2)
            .with_cancel(token)
            .with_progress(move |p| {
                if p.batches == 1 {
                    trigger.cancel();
                }
            });
        let report = load(&sample(), &catalog, &options).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.written, 2);
        assert_eq!(catalog.stats().unwrap().masterlist, 2);
        assert!(!report.is_complete());
    }

    #[test]
    fn elapsed_deadline_writes_nothing() {
        let catalog = Catalog::open_in_memory().unwrap();
        let options = LoadOptions::new().with_deadline(Instant::now());
        let report = load(&sample(), &catalog, &options).unwrap();
        assert!(report.deadline_exceeded);
        assert_eq!(report.written, 0);

        let generous = LoadOptions::new().with_deadline(Instant::now() + Duration::from_secs(60));
        assert!(load(&sample(), &catalog, &generous).unwrap().is_complete());
    }

    #[test]
    fn reset_makes_reload_idempotent() {
        let catalog = Catalog::open_in_memory().unwrap();
        let options = LoadOptions::new().with_reset(true);
        load(&sample(), &catalog, &options).unwrap();
        let first = catalog.masterlist().list(&PaginationParams::default()).unwrap();

        let mut shorter = sample();
        shorter.pop();
        load(&shorter, &catalog, &options).unwrap();
        load(&sample(), &catalog, &options).unwrap();
        let again = catalog.masterlist().list(&PaginationParams::default()).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn without_reset_rows_accumulate() {
        let catalog = Catalog::open_in_memory().unwrap();
        load(&sample()[..1], &catalog, &LoadOptions::new()).unwrap();
        load(&sample()[1..2], &catalog, &LoadOptions::new()).unwrap();
        assert_eq!(catalog.stats().unwrap().masterlist, 2);
    }

    #[test]
    fn inconsistent_tags_are_counted_not_rejected() {
        let catalog = Catalog::open_in_memory().unwrap();
        let records = vec![rec("1380100000", "City of Manila", "City")];
        let report = load(&records, &catalog, &LoadOptions::new()).unwrap();
        assert_eq!(report.inconsistent, 1);
        assert_eq!(
            catalog.city_muni().get_by_code("1380100000").unwrap().province_code,
            "1380100000"
        );
    }

    #[test]
    fn options_follow_load_config() {
        let config = LoadConfig {
            best_effort: true,
            batch_size: Some(10),
            ..LoadConfig::default()
        };
        let options = LoadOptions::from(&config);
        assert_eq!(options.mode, WriteMode::BestEffort);
        assert_eq!(options.batch_size, Some(10));
        assert!(options.reset);
    }
}
