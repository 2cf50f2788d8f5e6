use std::sync::Arc;

use crate::pipeline::Pipeline;
use crate::storage::UploadStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Where `/upload` writes incoming documents before the pipeline reads them.
    pub uploads: UploadStore,
    pub pipeline: Arc<Pipeline>,
}
