//! Route table shared by the server and its clients.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const REPORTS: &str = "/api/reports";
pub const REPORT: &str = "/api/reports/{id}";
pub const HEALTHZ: &str = "/healthz";

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}|:([A-Za-z_][A-Za-z0-9_]*)").expect("placeholder regex")
});

/// Substitute `{name}` (or `:name`) placeholders in `path` with matching params.
/// Placeholders without a param are left untouched; unused params are ignored.
pub fn build_url<V: ToString>(path: &str, params: &[(&str, V)]) -> String {
    PLACEHOLDER_RE
        .replace_all(path, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Concrete path for a single report.
pub fn report_url(id: i64) -> String {
    build_url(REPORT, &[("id", id)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_brace_placeholder() {
        assert_eq!(report_url(42), "/api/reports/42");
    }

    #[test]
    fn substitutes_colon_placeholder() {
        assert_eq!(build_url("/api/reports/:id", &[("id", 7)]), "/api/reports/7");
    }

    #[test]
    fn leaves_unknown_placeholder_and_ignores_extra_params() {
        assert_eq!(
            build_url("/api/reports/{id}", &[("other", "x")]),
            "/api/reports/{id}"
        );
        assert_eq!(build_url(REPORTS, &[("id", 1)]), REPORTS);
    }
}
