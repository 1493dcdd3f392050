//! Shared state for the API router.

use crate::db::RecordStore;
use crate::model_client::ModelClient;

/// Shared context for all API routes: the injectable store handle and the
/// outbound model client. Constructed once in `main` (or a test) and cloned
/// into handlers by axum.
#[derive(Clone)]
pub struct ApiContext {
    pub store: RecordStore,
    pub model: ModelClient,
}

impl ApiContext {
    pub fn new(store: RecordStore, model: ModelClient) -> Self {
        Self { store, model }
    }
}
