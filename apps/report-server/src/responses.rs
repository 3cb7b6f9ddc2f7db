use axum::{http::StatusCode, response::IntoResponse, Json};
use report_contracts::{ContractError, ErrorMessage};
use tracing::error;

use crate::service::ServiceError;

pub fn message(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, Json(ErrorMessage::new(message))).into_response()
}

pub fn invalid(err: &ContractError) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, Json(ErrorMessage::from(err))).into_response()
}

pub fn not_found() -> axum::response::Response {
    (StatusCode::NOT_FOUND, Json(ErrorMessage::not_found())).into_response()
}

/// Log the underlying failure and answer with an opaque 500.
pub(crate) fn store_failure(op: &'static str, err: &ServiceError) -> axum::response::Response {
    error!(target: "reports", op, "store failure: {err:?}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorMessage::internal()),
    )
        .into_response()
}
