use axum::extract::MatchedPath;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use once_cell::sync::Lazy;
use report_otel::ACCESS_TARGET;
use serde_json::{json, Value};
use sha2::Digest as _;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

#[derive(Clone, Debug, Default)]
struct Cfg {
    enabled: bool,
    sample_n: u64,
    ua: bool,
    ua_hash: bool,
    trust_forward: bool,
}

impl Cfg {
    fn from_env() -> Self {
        Self {
            enabled: std::env::var("REPORT_ACCESS_LOG").ok().as_deref() == Some("1"),
            sample_n: std::env::var("REPORT_ACCESS_SAMPLE_N")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1)
                .max(1),
            ua: std::env::var("REPORT_ACCESS_UA").ok().as_deref() == Some("1"),
            ua_hash: std::env::var("REPORT_ACCESS_UA_HASH").ok().as_deref() == Some("1"),
            trust_forward: std::env::var("REPORT_TRUST_FORWARD_HEADERS").ok().as_deref()
                == Some("1"),
        }
    }
}

static CFG: Lazy<Cfg> = Lazy::new(Cfg::from_env);

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn first_forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let v = headers.get("x-forwarded-for")?.to_str().ok()?;
    let ip = v.split(',').next().unwrap_or("").trim();
    (!ip.is_empty()).then(|| ip.to_string())
}

pub async fn access_log_mw(req: Request<axum::body::Body>, next: Next) -> Response {
    if !CFG.enabled {
        return next.run(req).await;
    }
    let started = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let connect_ip = req
        .extensions()
        .get::<axum::extract::ConnectInfo<SocketAddr>>()
        .map(|c| c.0.ip().to_string());
    let remote = if CFG.trust_forward {
        first_forwarded_ip(req.headers()).or(connect_ip)
    } else {
        connect_ip
    };
    let headers = req.headers().clone();
    let res = next.run(req).await;
    let n = COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    if CFG.sample_n > 1 && n % CFG.sample_n != 0 {
        return res;
    }
    let line = access_line(
        &CFG,
        method.as_str(),
        &path,
        res.status().as_u16(),
        started.elapsed().as_millis() as u64,
        remote,
        &headers,
    );
    info!(target: ACCESS_TARGET, "{line}");
    res
}

fn access_line(
    cfg: &Cfg,
    method: &str,
    path: &str,
    status: u16,
    dur_ms: u64,
    remote: Option<String>,
    headers: &HeaderMap,
) -> Value {
    let mut obj = json!({
        "ts": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "method": method,
        "path": path,
        "status": status,
        "dur_ms": dur_ms,
    });
    if let Some(ip) = remote {
        obj["remote"] = Value::String(ip);
    }
    if cfg.ua || cfg.ua_hash {
        if let Some(ua) = headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok())
        {
            if cfg.ua_hash {
                let d = sha2::Sha256::digest(ua.as_bytes());
                obj["ua_hash"] = Value::String(hex::encode(d));
            } else {
                obj["ua"] = Value::String(ua.to_string());
            }
        }
    }
    obj
}
