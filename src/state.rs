//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::library::Catalog;
use crate::presence::ConnectionTracker;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    catalog: Catalog,
    viewers: ConnectionTracker,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Self {
        let catalog = Catalog::new(config.library.pdf_dir.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                viewers: ConnectionTracker::new(),
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the PDF catalog
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get the viewer counter
    pub fn viewers(&self) -> &ConnectionTracker {
        &self.inner.viewers
    }
}
