//! psgc: load, query and serve the Philippine Standard Geographic Code
//!
//! Usage examples
//! --------------
//!
//! - Load the publication datafile (one transaction, tables cleared first)
//!   $ psgc generate --file files/csv/psgc_2023.csv
//!
//! - Inspect what was loaded
//!   $ psgc stats
//!   $ psgc list municipalities --filter ilocos
//!   $ psgc get barangays 0102805001
//!
//! - Serve the JSON API on PORT (default 5000)
//!   $ psgc serve
//!
//! Ctrl-C during `generate` stops after the batch in flight; committed
//! batches stay.

use anyhow::{bail, Context};
use chrono::Datelike;
use clap::Parser;
use psgc_cli::args::{CliArgs, Commands, TableArg};
use psgc_core::config::DatabaseConfig;
use psgc_core::loader::{self, default_source_path};
use psgc_core::{
    load, CancelToken, Catalog, CityMuniKind, LoadOptions, LoadReport, PaginationParams,
    PsgcConfig, WriteMode,
};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let mut config = load_config(&args)?;
    psgc_core::logging::init(&config.log);

    match args.command {
        Commands::Generate {
            file,
            year,
            batch_size,
            best_effort,
            keep_existing,
            timeout_secs,
        } => {
            let source = file
                .or_else(|| config.load.source.clone())
                .unwrap_or_else(|| default_source_path(year.unwrap_or_else(current_year)));

            let mut options = LoadOptions::from(&config.load);
            if let Some(size) = batch_size {
                options.batch_size = Some(size);
            }
            if best_effort {
                options.mode = WriteMode::BestEffort;
            }
            if keep_existing {
                options.reset = false;
            }
            if let Some(secs) = timeout_secs {
                options = options.with_deadline(Instant::now() + Duration::from_secs(secs));
            }
            let cancel = CancelToken::new();
            let options = options.with_cancel(cancel.clone()).with_progress(|p| {
                info!(batches = p.batches, written = p.written, total = p.total, "progress");
            });

            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, stopping after the current batch");
                    cancel.cancel();
                }
            });

            let database = config.database.clone();
            let report = tokio::task::spawn_blocking(move || generate(&source, &database, &options))
                .await
                .context("load task panicked")??;

            print_json(&report)?;
            if !report.is_complete() {
                bail!(
                    "load stopped early: {} of {} records written",
                    report.written,
                    report.total_input - report.duplicates
                );
            }
        }

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let catalog = open_existing(&config.database.path)?;
            let state = psgc_api::AppState::with_config(catalog, config.server.clone());
            psgc_api::serve(state, shutdown_signal())
                .await
                .context("HTTP server failed")?;
        }

        Commands::List {
            table,
            page,
            per_page,
            filter,
        } => {
            let catalog = open_existing(&config.database.path)?;
            let params = PaginationParams::new(page, per_page, filter);
            list(&catalog, table, &params)?;
        }

        Commands::Get { table, code } => {
            let catalog = open_existing(&config.database.path)?;
            get(&catalog, table, &code)?;
        }

        Commands::Stats => {
            let catalog = open_existing(&config.database.path)?;
            print_json(&catalog.stats()?)?;
        }

        #[cfg(feature = "json")]
        Commands::Export { out, year, gzip } => {
            let catalog = open_existing(&config.database.path)?;
            let options = psgc_core::export::ExportOptions {
                out_dir: out,
                year: year.unwrap_or_else(current_year),
                gzip,
            };
            for path in psgc_core::export::export_json(&catalog, &options)? {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> anyhow::Result<PsgcConfig> {
    let mut config = match &args.config {
        Some(path) => PsgcConfig::from_toml_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PsgcConfig::default(),
    };
    config.apply_env()?;
    if let Some(db) = &args.database {
        config.database.path = db.clone();
    }
    Ok(config)
}

fn generate(
    source: &Path,
    database: &DatabaseConfig,
    options: &LoadOptions,
) -> anyhow::Result<LoadReport> {
    let records = loader::parse(source).with_context(|| format!("reading {}", source.display()))?;
    let catalog = Catalog::from_config(database)
        .with_context(|| format!("opening {}", database.path.display()))?;
    Ok(load(&records, &catalog, options)?)
}

fn open_existing(path: &Path) -> anyhow::Result<Catalog> {
    Catalog::open_existing(path).with_context(|| {
        format!(
            "opening {} (run `psgc generate` first)",
            path.display()
        )
    })
}

fn list(catalog: &Catalog, table: TableArg, params: &PaginationParams) -> anyhow::Result<()> {
    match table {
        TableArg::Regions => print_json(&catalog.regions().list(params)?),
        TableArg::Provinces => print_json(&catalog.provinces().list(params)?),
        TableArg::CityMuni => print_json(&catalog.city_muni().list(params)?),
        TableArg::Cities => print_json(&catalog.city_muni().list_kind(CityMuniKind::City, params)?),
        TableArg::Municipalities => {
            print_json(&catalog.city_muni().list_kind(CityMuniKind::Mun, params)?)
        }
        TableArg::Barangays => print_json(&catalog.barangays().list(params)?),
        TableArg::Masterlist => print_json(&catalog.masterlist().list(params)?),
    }
}

fn get(catalog: &Catalog, table: TableArg, code: &str) -> anyhow::Result<()> {
    match table {
        TableArg::Regions => print_json(&catalog.regions().get_by_code(code)?),
        TableArg::Provinces => print_json(&catalog.provinces().get_by_code(code)?),
        TableArg::CityMuni => print_json(&catalog.city_muni().get_by_code(code)?),
        TableArg::Cities => {
            print_json(&catalog.city_muni().get_by_code_kind(CityMuniKind::City, code)?)
        }
        TableArg::Municipalities => {
            print_json(&catalog.city_muni().get_by_code_kind(CityMuniKind::Mun, code)?)
        }
        TableArg::Barangays => print_json(&catalog.barangays().get_by_code(code)?),
        TableArg::Masterlist => print_json(&catalog.masterlist().get_by_code(code)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
