use std::sync::Arc;

use wanderlust_core::Repository;

/// Shared handler state.
///
/// Holds the only handle to the persistence store; handlers keep no
/// listing data beyond a single request.
#[derive(Clone)]
pub struct AppState {
    repository: Arc<dyn Repository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &dyn Repository {
        self.repository.as_ref()
    }
}
