use std::sync::Arc;

use report_contracts::{NewReport, Report, ReportId};
use report_kernel::{ReportStore, DEFAULT_SEED_KEY};
use tracing::{debug, info};

use crate::seed;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ServiceError {
    /// Persistence failed. Never retried here and never mapped to a caller error.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Executes report operations against an injected store. Holds no copies of
/// stored rows between calls.
pub(crate) struct ReportService {
    store: Arc<dyn ReportStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    pub async fn list_reports(&self) -> Result<Vec<Report>, ServiceError> {
        let reports = self.store.list().await?;
        debug!(target: "reports", count = reports.len(), "listed reports");
        Ok(reports)
    }

    /// `Ok(None)` is the absent signal; translating it into not-found is the caller's job.
    pub async fn get_report(&self, id: ReportId) -> Result<Option<Report>, ServiceError> {
        Ok(self.store.get(id.get()).await?)
    }

    /// `input` must already have passed validation.
    pub async fn create_report(&self, input: NewReport) -> Result<Report, ServiceError> {
        let report = self.store.insert(&input).await?;
        info!(target: "reports", id = report.id, "report created");
        Ok(report)
    }

    /// Insert the default report unless it was seeded before, by this or any
    /// other instance sharing the store.
    pub async fn seed_default(&self) -> Result<bool, ServiceError> {
        let inserted = self
            .store
            .insert_seed(DEFAULT_SEED_KEY, &seed::default_report())
            .await?;
        if inserted {
            info!(target: "reports", "seeded default report");
        } else {
            debug!(target: "reports", "default report already present");
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FailingStore;
    use report_kernel::MemoryStore;
    use std::collections::HashSet;

    fn service() -> ReportService {
        ReportService::new(Arc::new(MemoryStore::new()))
    }

    fn id(raw: i64) -> ReportId {
        ReportId::new(raw).expect("positive id")
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let svc = service();
        let created = svc
            .create_report(NewReport::new("A", "x"))
            .await
            .expect("create");
        assert_eq!((created.title.as_str(), created.content.as_str()), ("A", "x"));
        let fetched = svc.get_report(id(created.id)).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn unknown_id_is_absent_not_error() {
        let svc = service();
        svc.create_report(NewReport::new("A", "x")).await.unwrap();
        assert_eq!(svc.get_report(id(999)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_contains_every_created_report_once() {
        let svc = service();
        let mut created = HashSet::new();
        for i in 0..10 {
            let r = svc
                .create_report(NewReport::new(format!("title-{i}"), "body"))
                .await
                .unwrap();
            assert!(created.insert(r.id), "duplicate id {}", r.id);
        }
        let listed = svc.list_reports().await.unwrap();
        let listed_ids: Vec<i64> = listed.iter().map(|r| r.id).collect();
        assert_eq!(listed_ids.len(), created.len());
        assert!(listed_ids.iter().all(|id| created.contains(id)));
    }

    #[tokio::test]
    async fn seeding_twice_inserts_once() {
        let svc = service();
        assert!(svc.seed_default().await.unwrap());
        assert!(!svc.seed_default().await.unwrap());
        let listed = svc.list_reports().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, seed::DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let svc = ReportService::new(Arc::new(FailingStore));
        let err = svc.create_report(NewReport::new("A", "x")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
        assert!(svc.list_reports().await.is_err());
        assert!(svc.get_report(id(1)).await.is_err());
    }
}
