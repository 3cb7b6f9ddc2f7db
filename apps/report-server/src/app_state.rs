use std::sync::Arc;

use crate::service::ReportService;

#[derive(Clone)]
pub(crate) struct AppState {
    reports: Arc<ReportService>,
    endpoints: Arc<Vec<String>>,
    endpoints_meta: Arc<Vec<serde_json::Value>>,
}

impl AppState {
    pub fn new(
        reports: Arc<ReportService>,
        endpoints: Arc<Vec<String>>,
        endpoints_meta: Arc<Vec<serde_json::Value>>,
    ) -> Self {
        Self {
            reports,
            endpoints,
            endpoints_meta,
        }
    }

    pub fn reports(&self) -> &ReportService {
        &self.reports
    }

    pub fn endpoints(&self) -> Arc<Vec<String>> {
        self.endpoints.clone()
    }

    pub fn endpoints_meta(&self) -> Arc<Vec<serde_json::Value>> {
        self.endpoints_meta.clone()
    }
}
