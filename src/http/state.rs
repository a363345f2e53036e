//! Application state for the HTTP server.

use std::sync::Arc;

use crate::catalog::Catalog;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}
