use report_contracts::{ErrorMessage, NewReport, Report};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct HealthOk {
    pub ok: bool,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::meta::healthz,
        crate::api::meta::about,
        crate::api::reports::reports_list,
        crate::api::reports::reports_get,
        crate::api::reports::reports_create,
    ),
    components(schemas(Report, NewReport, ErrorMessage, HealthOk)),
    tags(
        (name = "Reports", description = "Append-only report records"),
        (name = "Meta", description = "Service health and discovery")
    )
)]
pub struct ApiDoc;
