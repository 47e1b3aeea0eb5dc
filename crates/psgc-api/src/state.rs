// crates/psgc-api/src/state.rs
use psgc_core::config::ServerConfig;
use psgc_core::Catalog;
use std::time::Duration;

/// Shared by every handler. Cloning is cheap: the catalog is a shared handle.
#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_config(catalog, ServerConfig::default())
    }

    pub fn with_config(catalog: Catalog, config: ServerConfig) -> Self {
        Self { catalog, config }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.config.request_timeout_secs.map(Duration::from_secs)
    }
}
