//! Wire contracts for the report resource API.
//! These types are hand-written and deliberately independent of the storage schema.

mod message;
mod report;
pub mod routes;

pub use message::*;
pub use report::*;

/// Shared error type for contract validation routines.
#[derive(thiserror::Error, Debug)]
pub enum ContractError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} must be a string, received {received}")]
    WrongType {
        field: &'static str,
        received: &'static str,
    },
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("request body must be a JSON object, received {0}")]
    NotAnObject(&'static str),
    #[error("invalid report id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ContractError {
    /// Name of the offending field, when the failure is attributable to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ContractError::Missing(field)
            | ContractError::WrongType { field, .. }
            | ContractError::Empty(field) => Some(*field),
            ContractError::InvalidId(_) => Some("id"),
            ContractError::NotAnObject(_) | ContractError::Json(_) => None,
        }
    }
}

/// Lightweight semantic validation applied on top of deserialization, before any
/// value reaches the store.
pub trait Validate {
    fn validate(&self) -> Result<(), ContractError>;
}
