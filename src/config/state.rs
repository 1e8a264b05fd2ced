// Application state module
// Immutable per-process state shared by every connection

use std::fmt;
use std::sync::Arc;

use super::types::Config;
use crate::store::TodoStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn TodoStore>) -> Self {
        Self { config, store }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
