use std::sync::Arc;

use report_kernel::{StoreTarget, StoreTargetError};
use tracing::info;
use utoipa::OpenApi;

use crate::{access_log, router, security, service::ReportService, AppState};

pub(crate) struct BootstrapOutput {
    pub router: axum::Router<()>,
    pub state: AppState,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("DATABASE_URL must be set to the report store connection string")]
    MissingDatabaseUrl,
    #[error("invalid DATABASE_URL: {0}")]
    InvalidDatabaseUrl(#[from] StoreTargetError),
    #[error("invalid REPORT_HTTP_MAX_CONC: {0}")]
    InvalidConcurrency(String),
    #[error("invalid REPORT_HTTP_MAX_BODY_BYTES: {0}")]
    InvalidBodyLimit(String),
    #[error("invalid REPORT_PORT: {0}")]
    InvalidPort(String),
    #[error("invalid REPORT_BIND: {0}")]
    InvalidBind(String),
}

/// Request body cap when `REPORT_HTTP_MAX_BODY_BYTES` is unset.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub(crate) struct HttpConfig {
    pub addr: std::net::SocketAddr,
    pub concurrency_limit: usize,
    pub max_body_bytes: usize,
}

pub(crate) struct ServerConfig {
    pub store: StoreTarget,
    pub http: HttpConfig,
    pub seed: bool,
}

/// Read process configuration once at startup. A missing `DATABASE_URL` is fatal.
pub(crate) fn config_from_env() -> Result<ServerConfig, ConfigError> {
    let raw = std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;
    let store = StoreTarget::parse(&raw)?;
    let http = http_config_from_env()?;
    let seed = std::env::var("REPORT_SEED").ok().as_deref() == Some("1");
    Ok(ServerConfig { store, http, seed })
}

pub(crate) fn http_config_from_env() -> Result<HttpConfig, ConfigError> {
    let concurrency_limit = std::env::var("REPORT_HTTP_MAX_CONC")
        .ok()
        .map(|raw| match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidConcurrency(raw)),
        })
        .transpose()? // Option<Result> -> Result<Option>
        .unwrap_or(1024);

    let max_body_bytes = std::env::var("REPORT_HTTP_MAX_BODY_BYTES")
        .ok()
        .map(|raw| match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidBodyLimit(raw)),
        })
        .transpose()?
        .unwrap_or(DEFAULT_MAX_BODY_BYTES);

    let bind = std::env::var("REPORT_BIND").unwrap_or_else(|_| "127.0.0.1".into());
    let port_raw = std::env::var("REPORT_PORT").unwrap_or_else(|_| "8091".into());
    let port: u16 = port_raw
        .parse()
        .map_err(|_| ConfigError::InvalidPort(port_raw))?;

    let host = if bind.contains(':') && !bind.starts_with('[') {
        format!("[{bind}]")
    } else {
        bind.clone()
    };
    let addr = format!("{}:{}", host, port)
        .parse()
        .map_err(|_| ConfigError::InvalidBind(bind))?;

    Ok(HttpConfig {
        addr,
        concurrency_limit,
        max_body_bytes,
    })
}

/// Open the store, wire the service and optionally seed the default report.
pub(crate) async fn build(cfg: &ServerConfig) -> anyhow::Result<BootstrapOutput> {
    let store = report_kernel::open_store_async(&cfg.store).await?;
    info!(store = ?cfg.store, "report store ready");
    let service = Arc::new(ReportService::new(store));
    if cfg.seed {
        service.seed_default().await?;
    }

    let (router, endpoints, endpoints_meta) = router::build_router();
    let state = AppState::new(service, Arc::new(endpoints), Arc::new(endpoints_meta));
    let router = router.with_state::<()>(state.clone());
    Ok(BootstrapOutput { router, state })
}

pub(crate) fn attach_http_layers(router: axum::Router<()>, http: &HttpConfig) -> axum::Router<()> {
    use axum::extract::DefaultBodyLimit;
    use tower::limit::ConcurrencyLimitLayer;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    router
        .layer(DefaultBodyLimit::max(http.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(ConcurrencyLimitLayer::new(http.concurrency_limit))
}

pub(crate) fn attach_global_layers(router: axum::Router<()>) -> axum::Router<()> {
    router
        .layer(axum::middleware::from_fn(access_log::access_log_mw))
        .layer(axum::middleware::from_fn(security::headers_mw))
}

/// When `OPENAPI_OUT` is set, write the OpenAPI document there and report the path.
pub(crate) fn ensure_openapi_export() -> Result<Option<String>, std::io::Error> {
    if let Ok(path) = std::env::var("OPENAPI_OUT") {
        export_openapi(&path)?;
        return Ok(Some(path));
    }
    Ok(None)
}

fn export_openapi(path: &str) -> Result<(), std::io::Error> {
    if let Some(parent) = std::path::Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = crate::openapi::ApiDoc::openapi()
        .to_yaml()
        .map_err(std::io::Error::other)?;
    std::fs::write(path, yaml)
}
