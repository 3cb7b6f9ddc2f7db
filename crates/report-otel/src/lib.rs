use once_cell::sync::OnceCell;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

/// Tracing target used for per-request access lines.
pub const ACCESS_TARGET: &str = "http.access";

static ACCESS_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Minutely,
    Hourly,
    Daily,
}

impl Rotation {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hourly" => Rotation::Hourly,
            "minutely" => Rotation::Minutely,
            _ => Rotation::Daily,
        }
    }
}

/// Rolling file sink for `http.access` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRollConfig {
    pub dir: String,
    pub prefix: String,
    pub rotation: Rotation,
}

impl AccessRollConfig {
    /// Reads `REPORT_ACCESS_LOG_ROLL`, `REPORT_ACCESS_LOG_DIR`, `REPORT_ACCESS_LOG_PREFIX`
    /// and `REPORT_ACCESS_LOG_ROTATION`. Returns `None` unless rolling is enabled.
    pub fn from_env() -> Option<Self> {
        if std::env::var("REPORT_ACCESS_LOG_ROLL").ok().as_deref() != Some("1") {
            return None;
        }
        Some(Self {
            dir: std::env::var("REPORT_ACCESS_LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            prefix: std::env::var("REPORT_ACCESS_LOG_PREFIX")
                .unwrap_or_else(|_| "http-access".into()),
            rotation: Rotation::parse(
                &std::env::var("REPORT_ACCESS_LOG_ROTATION").unwrap_or_default(),
            ),
        })
    }
}

/// Install the global subscriber: console output filtered by `RUST_LOG`
/// (default `info`) plus the optional rolling access log.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer();
    let registry = tracing_subscriber::registry().with(fmt_layer.with_filter(filter));
    if let Some(cfg) = AccessRollConfig::from_env() {
        if std::fs::create_dir_all(&cfg.dir).is_err() {
            tracing::warn!(directory = %cfg.dir, "failed to create access log directory");
        }
        let writer = match cfg.rotation {
            Rotation::Hourly => tracing_appender::rolling::hourly(&cfg.dir, &cfg.prefix),
            Rotation::Minutely => tracing_appender::rolling::minutely(&cfg.dir, &cfg.prefix),
            Rotation::Daily => tracing_appender::rolling::daily(&cfg.dir, &cfg.prefix),
        };
        let (nb, guard) = tracing_appender::non_blocking(writer);
        let _ = ACCESS_GUARD.set(guard);
        let targets = Targets::new().with_target(ACCESS_TARGET, tracing::Level::INFO);
        let access_layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(nb)
            .with_filter(targets);
        let _ = registry.with(access_layer).try_init();
    } else {
        let _ = registry.try_init();
    }
}
