use crate::{ContractError, Validate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// A persisted report as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Report {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "SWE 261P Project Report")]
    pub title: String,
    pub content: String,
}

/// Create input. Build it with [`NewReport::from_value`] so that field checks run
/// in a fixed order and report the first offending field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct NewReport {
    pub title: String,
    pub content: String,
}

impl NewReport {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Decode and validate a create body. Checks `title` before `content`; extra
    /// fields (including any client-supplied `id`) are ignored.
    pub fn from_value(body: &Value) -> Result<Self, ContractError> {
        let map = match body {
            Value::Object(map) => map,
            other => return Err(ContractError::NotAnObject(json_type_name(other))),
        };
        let title = required_string(map, "title")?;
        let content = required_string(map, "content")?;
        let report = Self { title, content };
        report.validate()?;
        Ok(report)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ContractError> {
        let body: Value = serde_json::from_slice(bytes)?;
        Self::from_value(&body)
    }
}

impl Validate for NewReport {
    fn validate(&self) -> Result<(), ContractError> {
        if self.title.is_empty() {
            return Err(ContractError::Empty("title"));
        }
        Ok(())
    }
}

fn required_string(map: &Map<String, Value>, field: &'static str) -> Result<String, ContractError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(ContractError::Missing(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ContractError::WrongType {
            field,
            received: json_type_name(other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Path identifier for get-by-id. Only positive whole numbers parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportId(i64);

impl ReportId {
    pub fn new(raw: i64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for ReportId {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ContractError::InvalidId(s.to_string()));
        }
        s.parse::<i64>()
            .ok()
            .and_then(ReportId::new)
            .ok_or_else(|| ContractError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
