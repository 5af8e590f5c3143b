use std::sync::Arc;

use crate::auth::{SessionStore, UserStore};
use crate::catalog::CatalogStore;
use crate::upstream::ReviewBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Dealer/review and sentiment services. Default: `UpstreamClient`.
    pub backend: Arc<dyn ReviewBackend>,
    pub catalog: Arc<CatalogStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub users: Arc<dyn UserStore>,
}
