//! OpenAPI specification endpoints

use actix_web::{HttpResponse, Responder, get};
use utoipa::OpenApi;

use crate::api::{charts, error, health, home, map, navigation, records, views};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "mRNA BioPharma Analytics API",
        description = "Record forms, filtered views, aggregate charts and a coverage map"
    ),
    paths(
        health::liveness,
        health::readiness,
        home::home,
        navigation::list_views,
        navigation::navigate,
        records::list_countries,
        records::create_vaccination,
        records::create_contract,
        records::create_adverse_event,
        records::vaccination_options,
        records::contract_options,
        records::adverse_event_options,
        records::update_vaccination,
        records::update_contract,
        records::update_adverse_event,
        records::delete_vaccination,
        records::delete_contract,
        records::delete_adverse_event,
        views::list_vaccinations,
        views::export_vaccinations,
        views::list_contracts,
        views::export_contracts,
        views::list_adverse_events,
        views::export_adverse_events,
        charts::list_charts,
        charts::get_chart,
        map::date_range,
        map::coverage_map,
        map::export_coverage,
    ),
    components(schemas(
        error::ErrorResponse,
        crate::service::ExportFormat,
        crate::model::AgeGroup,
        crate::model::Severity,
    )),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "home", description = "Landing page"),
        (name = "navigation", description = "View dispatch"),
        (name = "records", description = "Add, update and delete records"),
        (name = "views", description = "Filtered tables and downloads"),
        (name = "charts", description = "Aggregate chart data"),
        (name = "map", description = "Vaccination coverage map")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> Result<HttpResponse, error::ApiError> {
    let yaml = ApiDoc::openapi()
        .to_yaml()
        .map_err(|e| error::ApiError::Internal(e.to_string()))?;
    Ok(HttpResponse::Ok().content_type("text/yaml").body(yaml))
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
