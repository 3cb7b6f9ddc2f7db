use anyhow::{anyhow, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use report_contracts::{NewReport, Report};
use report_kernel::ReportStore;
use std::sync::{Arc, Mutex};

use crate::{
    bootstrap::{self, HttpConfig, DEFAULT_MAX_BODY_BYTES},
    router,
    service::ReportService,
    AppState,
};

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub(crate) mod env {
    use super::ENV_LOCK;
    use std::ffi::{OsStr, OsString};
    use std::sync::MutexGuard;

    /// Exclusive handle on the process environment for one test. Variables touched
    /// through it are put back, last change first, when it drops.
    pub(crate) struct EnvScope {
        _lock: MutexGuard<'static, ()>,
        touched: Vec<(String, Option<OsString>)>,
    }

    pub(crate) fn scope() -> EnvScope {
        // a panicking test must not wedge every later env test
        let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        EnvScope {
            _lock: lock,
            touched: Vec::new(),
        }
    }

    impl EnvScope {
        fn snapshot(&mut self, key: &str) {
            if !self.touched.iter().any(|(k, _)| k == key) {
                self.touched.push((key.to_string(), std::env::var_os(key)));
            }
        }

        pub(crate) fn set(&mut self, key: &str, value: impl AsRef<OsStr>) -> &mut Self {
            self.snapshot(key);
            std::env::set_var(key, value);
            self
        }

        pub(crate) fn unset(&mut self, key: &str) -> &mut Self {
            self.snapshot(key);
            std::env::remove_var(key);
            self
        }

        pub(crate) fn unset_all(&mut self, keys: &[&str]) -> &mut Self {
            for key in keys {
                self.unset(key);
            }
            self
        }
    }

    impl Drop for EnvScope {
        fn drop(&mut self) {
            while let Some((key, prev)) = self.touched.pop() {
                match prev {
                    Some(value) => std::env::set_var(&key, value),
                    None => std::env::remove_var(&key),
                }
            }
        }
    }
}

/// Store double whose every operation fails, for exercising the 500 path.
pub(crate) struct FailingStore;

#[async_trait]
impl ReportStore for FailingStore {
    async fn list(&self) -> Result<Vec<Report>> {
        Err(anyhow!("store unavailable"))
    }

    async fn get(&self, _id: i64) -> Result<Option<Report>> {
        Err(anyhow!("store unavailable"))
    }

    async fn insert(&self, _new: &NewReport) -> Result<Report> {
        Err(anyhow!("store unavailable"))
    }

    async fn insert_seed(&self, _key: &str, _new: &NewReport) -> Result<bool> {
        Err(anyhow!("store unavailable"))
    }
}

/// Application state over `store` with the production route table.
pub(crate) fn state_with(store: Arc<dyn ReportStore>) -> AppState {
    let (_, endpoints, endpoints_meta) = router::build_router();
    AppState::new(
        Arc::new(ReportService::new(store)),
        Arc::new(endpoints),
        Arc::new(endpoints_meta),
    )
}

/// Fully layered router over `store`, as served in production.
pub(crate) fn app_with(store: Arc<dyn ReportStore>) -> axum::Router {
    app_with_body_limit(store, DEFAULT_MAX_BODY_BYTES)
}

pub(crate) fn app_with_body_limit(
    store: Arc<dyn ReportStore>,
    max_body_bytes: usize,
) -> axum::Router {
    let state = state_with(store);
    let (router, _, _) = router::build_router();
    let http = HttpConfig {
        addr: ([127, 0, 0, 1], 0).into(),
        concurrency_limit: 64,
        max_body_bytes,
    };
    bootstrap::attach_global_layers(bootstrap::attach_http_layers(
        router.with_state::<()>(state),
        &http,
    ))
}
