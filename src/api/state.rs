//! Shared application state

use crate::service::StatementService;

/// Shared state for axum request handlers
pub struct AppState {
    /// The statement service
    pub service: StatementService,
}

impl AppState {
    pub fn new(service: StatementService) -> Self {
        Self { service }
    }
}
