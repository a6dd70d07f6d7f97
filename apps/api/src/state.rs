use std::sync::Arc;

use crate::candidates::store::CandidateStore;
use crate::uploads::UploadStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Candidate gateway. `PgCandidateStore` in production.
    pub store: Arc<dyn CandidateStore>,
    pub uploads: UploadStore,
}
