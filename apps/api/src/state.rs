use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::extract::ExtractedPosting;
use crate::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: JobStore,
    pub config: Config,
    /// Most recent posting extraction, kept so a panel that attaches after
    /// a page was scraped can still pick the data up.
    pub latest_extraction: Arc<Mutex<Option<ExtractedPosting>>>,
}

impl AppState {
    pub fn new(store: JobStore, config: Config) -> Self {
        AppState {
            store,
            config,
            latest_extraction: Arc::new(Mutex::new(None)),
        }
    }
}
