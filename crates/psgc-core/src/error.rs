// crates/psgc-core/src/error.rs

use thiserror::Error;

/// Every failure the core can report.
///
/// Ingestion failures (`Io`, `Parse`) abort a run before anything is written.
/// `Persistence` names the record whose write failed; `NotFound` is the
/// expected outcome of a lookup miss and is matched on by the transports.
#[derive(Debug, Error)]
pub enum PsgcError {
    #[error("I/O error on {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Parse(String),

    #[error("failed to write record {code}: {source}")]
    Persistence {
        code: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("table `{0}` does not exist; load a PSGC file first")]
    MissingTable(&'static str),

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("{level} {code} not found")]
    NotFound { level: &'static str, code: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PsgcError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// `true` for a lookup miss, the only error a transport should not log as a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, PsgcError>;
