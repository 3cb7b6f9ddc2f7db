use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use report_contracts::{ErrorMessage, NewReport, Report, ReportId};
use tracing::debug;

use crate::{responses, AppState};

/// List every stored report.
#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "Reports",
    responses(
        (status = 200, description = "All reports", body = Vec<Report>),
        (status = 500, description = "Store failure", body = ErrorMessage)
    )
)]
pub async fn reports_list(State(state): State<AppState>) -> axum::response::Response {
    match state.reports().list_reports().await {
        Ok(reports) => Json(reports).into_response(),
        Err(err) => responses::store_failure("list", &err),
    }
}

/// Fetch a single report by id.
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    tag = "Reports",
    params(("id" = i64, Path, description = "Report id (positive integer)")),
    responses(
        (status = 200, description = "Report", body = Report),
        (status = 400, description = "Id is not a positive integer", body = ErrorMessage),
        (status = 404, description = "Report not found", body = ErrorMessage),
        (status = 500, description = "Store failure", body = ErrorMessage)
    )
)]
pub async fn reports_get(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> axum::response::Response {
    let id = match raw_id.parse::<ReportId>() {
        Ok(id) => id,
        Err(err) => return responses::invalid(&err),
    };
    match state.reports().get_report(id).await {
        Ok(Some(report)) => Json(report).into_response(),
        Ok(None) => {
            debug!(target: "reports", %id, "report not found");
            responses::not_found()
        }
        Err(err) => responses::store_failure("get", &err),
    }
}

/// Create a report. The id is assigned by the store.
#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "Reports",
    request_body = NewReport,
    responses(
        (status = 201, description = "Created", body = Report),
        (status = 400, description = "Validation failed or body is not JSON", body = ErrorMessage),
        (status = 413, description = "Body exceeds the configured limit", body = ErrorMessage),
        (status = 500, description = "Store failure", body = ErrorMessage)
    )
)]
pub async fn reports_create(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> axum::response::Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let status = match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            return responses::message(status, rejection.body_text());
        }
    };
    let input = match NewReport::from_slice(&body) {
        Ok(input) => input,
        Err(err) => {
            debug!(target: "reports", field = ?err.field(), "create rejected: {err}");
            return responses::invalid(&err);
        }
    };
    match state.reports().create_report(input).await {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(err) => responses::store_failure("create", &err),
    }
}
