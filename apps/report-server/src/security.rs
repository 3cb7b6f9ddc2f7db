use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Baseline response headers for a JSON-only API. Never overrides a header a
/// handler already set.
pub async fn headers_mw(req: Request<axum::body::Body>, next: Next) -> Response {
    let mut res = next.run(req).await;
    let h = res.headers_mut();
    add_header(h, header::X_CONTENT_TYPE_OPTIONS, "nosniff");
    add_header(h, header::X_FRAME_OPTIONS, "DENY");
    let refpol = std::env::var("REPORT_REFERRER_POLICY").unwrap_or_else(|_| "no-referrer".into());
    add_header(h, header::REFERRER_POLICY, &refpol);
    if std::env::var("REPORT_HSTS").ok().as_deref() == Some("1") {
        add_header(
            h,
            header::STRICT_TRANSPORT_SECURITY,
            "max-age=31536000; includeSubDomains",
        );
    }
    res
}

fn add_header(h: &mut HeaderMap, name: HeaderName, val: &str) {
    if !h.contains_key(&name) {
        if let Ok(v) = HeaderValue::from_str(val) {
            h.insert(name, v);
        }
    }
}
