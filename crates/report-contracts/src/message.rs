use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every non-success response: `{ "message": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(NOT_FOUND_MESSAGE)
    }

    pub fn internal() -> Self {
        Self::new(INTERNAL_MESSAGE)
    }
}

impl From<&crate::ContractError> for ErrorMessage {
    fn from(err: &crate::ContractError) -> Self {
        Self::new(err.to_string())
    }
}

pub const NOT_FOUND_MESSAGE: &str = "Report not found";
pub const INTERNAL_MESSAGE: &str = "Internal Server Error";
