//! Shared application state.

use std::sync::Arc;

use critics_core::repository::DocumentSearch;
use critics_dialog::domain::programs::ProgramCatalog;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read access to the document store.
    pub search: Arc<dyn DocumentSearch>,
    /// Programs accepted by the by-program listing.
    pub catalog: Arc<ProgramCatalog>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(search: Arc<dyn DocumentSearch>, catalog: ProgramCatalog) -> Self {
        Self {
            search,
            catalog: Arc::new(catalog),
        }
    }
}
