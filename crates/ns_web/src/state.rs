use std::sync::Arc;

use ns_sources::ReportManager;

pub struct AppState {
    pub manager: Arc<ReportManager>,
}

impl AppState {
    pub fn new(manager: ReportManager) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }
}
