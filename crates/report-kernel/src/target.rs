use std::path::PathBuf;

/// Where reports live, decoded from the process connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    Sqlite(PathBuf),
    Memory,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreTargetError {
    #[error("connection string is empty")]
    Empty,
    #[error("unsupported store scheme `{0}` (expected sqlite:, file: or memory:)")]
    UnsupportedScheme(String),
}

impl StoreTarget {
    /// Accepts `sqlite://<path>`, `sqlite:<path>`, `file:<path>`, `memory:` and
    /// bare filesystem paths. `sqlite::memory:` maps to the in-memory store.
    pub fn parse(raw: &str) -> Result<Self, StoreTargetError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(StoreTargetError::Empty);
        }
        if raw.eq_ignore_ascii_case("memory:") || raw.eq_ignore_ascii_case("memory") {
            return Ok(StoreTarget::Memory);
        }
        let path = if let Some(rest) = raw.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = raw.strip_prefix("sqlite:") {
            rest
        } else if let Some(rest) = raw.strip_prefix("file:") {
            rest.strip_prefix("//").unwrap_or(rest)
        } else if let Some((scheme, _)) = raw.split_once("://") {
            return Err(StoreTargetError::UnsupportedScheme(scheme.to_string()));
        } else {
            raw
        };
        // query parameters (e.g. `?mode=rwc`) are not used
        let path = path.split('?').next().unwrap_or_default();
        if path == ":memory:" {
            return Ok(StoreTarget::Memory);
        }
        if path.is_empty() {
            return Err(StoreTargetError::Empty);
        }
        Ok(StoreTarget::Sqlite(PathBuf::from(path)))
    }
}
