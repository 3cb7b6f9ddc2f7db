use anyhow::Result;
use async_trait::async_trait;
use report_contracts::{NewReport, Report};
use std::collections::HashSet;
use tokio::sync::RwLock;

use crate::ReportStore;

/// Process-local store with the same semantics as [`crate::Kernel`]. Contents are
/// lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    rows: Vec<Report>,
    seeds: HashSet<String>,
    last_id: i64,
}

impl Inner {
    fn push(&mut self, new: &NewReport) -> Report {
        self.last_id += 1;
        let report = Report {
            id: self.last_id,
            title: new.title.clone(),
            content: new.content.clone(),
        };
        self.rows.push(report.clone());
        report
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Report>> {
        Ok(self.inner.read().await.rows.clone())
    }

    async fn get(&self, id: i64) -> Result<Option<Report>> {
        let inner = self.inner.read().await;
        // ids are allocated in ascending order
        Ok(inner
            .rows
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|idx| inner.rows[idx].clone()))
    }

    async fn insert(&self, new: &NewReport) -> Result<Report> {
        Ok(self.inner.write().await.push(new))
    }

    async fn insert_seed(&self, key: &str, new: &NewReport) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if !inner.seeds.insert(key.to_string()) {
            return Ok(false);
        }
        inner.push(new);
        Ok(true)
    }
}
