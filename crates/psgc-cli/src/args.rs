// crates/psgc-cli/src/args.rs
use clap::{Parser, Subcommand, ValueEnum};
use psgc_core::query::DEFAULT_PER_PAGE;
use std::path::PathBuf;

/// CLI arguments for psgc
#[derive(Debug, Parser)]
#[command(
    name = "psgc",
    version,
    about = "Load the Philippine Standard Geographic Code into SQLite, query it, and serve it over HTTP"
)]
pub struct CliArgs {
    /// TOML settings file (sections: database, load, server, log)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file; overrides the config file and PSGC_DB
    #[arg(short = 'd', long = "database", global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a PSGC publication CSV and load it into the database
    Generate {
        /// CSV (or .csv.gz) to load (default: files/csv/psgc_<year>.csv)
        #[arg(short = 'f', long = "file")]
        file: Option<PathBuf>,

        /// Publication year used for the default file name (default: current year)
        #[arg(long)]
        year: Option<i32>,

        /// Records per transaction (default: the whole file in one transaction)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Attempt every record even after a failure
        #[arg(long)]
        best_effort: bool,

        /// Keep existing rows instead of clearing the tables first
        #[arg(long)]
        keep_existing: bool,

        /// Stop dispatching batches after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Serve the read-only HTTP API
    Serve {
        /// Bind address (default: 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port (default: PORT or 5000)
        #[arg(short = 'p', long)]
        port: Option<u16>,
    },

    /// Print one page of a table as JSON
    List {
        table: TableArg,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long = "per-page", default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,

        /// Case-insensitive substring matched against code and name
        #[arg(short = 'q', long, default_value = "")]
        filter: String,
    },

    /// Print one entity by its 10-digit code
    Get { table: TableArg, code: String },

    /// Show row counts per table
    Stats,

    /// Write per-level JSON files with ancestor codes
    #[cfg(feature = "json")]
    Export {
        /// Output directory
        #[arg(short = 'o', long = "out", default_value = "files/json")]
        out: PathBuf,

        /// Year prefix of the file names (default: current year)
        #[arg(long)]
        year: Option<i32>,

        /// Write .json.gz files
        #[arg(long)]
        gzip: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableArg {
    Regions,
    Provinces,
    CityMuni,
    Cities,
    Municipalities,
    Barangays,
    Masterlist,
}
