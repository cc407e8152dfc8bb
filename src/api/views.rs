//! REST API endpoints for the View Data tables and their downloads

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{AdverseEvent, Contract, TabularRow, Vaccination, ViewConfig};
use crate::service::export::{Export, ExportFormat, export};
use crate::service::records::{adverse_event_filter, contract_filter, vaccination_filter};
use crate::service::RecordService;

/// Query parameters for the vaccinations table
#[derive(Debug, Deserialize, IntoParams)]
pub struct VaccinationQuery {
    /// Comma separated age groups (0-17, 18-30, 31-50, 51-70, 70+); all when absent
    pub age_group: Option<String>,
    /// Exact country name
    pub country: Option<String>,
    /// Download format for the export endpoint (csv or xlsx, default: csv)
    pub format: Option<ExportFormat>,
}

/// Query parameters for the contracts table
#[derive(Debug, Deserialize, IntoParams)]
pub struct ContractQuery {
    /// Highest price per dose shown, 0 to 50 (default from configuration)
    pub max_price: Option<f64>,
    /// Download format for the export endpoint (csv or xlsx, default: csv)
    pub format: Option<ExportFormat>,
}

/// Query parameters for the adverse events table
#[derive(Debug, Deserialize, IntoParams)]
pub struct AdverseEventQuery {
    /// Comma separated severities (Mild, Moderate, Severe); all when absent
    pub severity: Option<String>,
    /// Download format for the export endpoint (csv or xlsx, default: csv)
    pub format: Option<ExportFormat>,
}

/// Wrap an encoded export as an attachment response
pub fn attachment(export: Export) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(export.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(export.filename)],
        })
        .body(export.bytes)
}

fn download<R: TabularRow>(
    rows: &[R],
    format: Option<ExportFormat>,
    stem: &str,
    sheet: &str,
) -> Result<HttpResponse, ApiError> {
    Ok(attachment(export(rows, format.unwrap_or_default(), stem, sheet)?))
}

/// List vaccinations, optionally filtered by age group and country
#[utoipa::path(
    get,
    path = "/v1/vaccinations",
    params(VaccinationQuery),
    responses(
        (status = 200, description = "Vaccinations retrieved successfully", body = Vec<Vaccination>),
        (status = 400, description = "Unknown age group", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "views"
)]
#[get("/v1/vaccinations")]
pub async fn list_vaccinations(
    service: web::Data<RecordService>,
    query: web::Query<VaccinationQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = vaccination_filter(query.age_group.as_deref(), query.country.as_deref())?;
    Ok(HttpResponse::Ok().json(service.vaccinations(&filter).await?))
}

/// Download the filtered vaccinations table
#[utoipa::path(
    get,
    path = "/v1/vaccinations/export",
    params(VaccinationQuery),
    responses(
        (status = 200, description = "CSV or XLSX attachment"),
        (status = 400, description = "Unknown age group", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "views"
)]
#[get("/v1/vaccinations/export")]
pub async fn export_vaccinations(
    service: web::Data<RecordService>,
    query: web::Query<VaccinationQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = vaccination_filter(query.age_group.as_deref(), query.country.as_deref())?;
    let rows = service.vaccinations(&filter).await?;
    download(&rows, query.format, "vaccinations", "Vaccinations")
}

/// List contracts at or below a price per dose
#[utoipa::path(
    get,
    path = "/v1/contracts",
    params(ContractQuery),
    responses(
        (status = 200, description = "Contracts retrieved successfully", body = Vec<Contract>),
        (status = 400, description = "Price ceiling outside 0 to 50", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "views"
)]
#[get("/v1/contracts")]
pub async fn list_contracts(
    service: web::Data<RecordService>,
    views: web::Data<ViewConfig>,
    query: web::Query<ContractQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = contract_filter(query.max_price, views.default_max_price)?;
    Ok(HttpResponse::Ok().json(service.contracts(&filter).await?))
}

/// Download the filtered contracts table
#[utoipa::path(
    get,
    path = "/v1/contracts/export",
    params(ContractQuery),
    responses(
        (status = 200, description = "CSV or XLSX attachment"),
        (status = 400, description = "Price ceiling outside 0 to 50", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "views"
)]
#[get("/v1/contracts/export")]
pub async fn export_contracts(
    service: web::Data<RecordService>,
    views: web::Data<ViewConfig>,
    query: web::Query<ContractQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = contract_filter(query.max_price, views.default_max_price)?;
    let rows = service.contracts(&filter).await?;
    download(&rows, query.format, "contracts", "Contracts")
}

/// List adverse events, optionally filtered by severity
#[utoipa::path(
    get,
    path = "/v1/adverse-events",
    params(AdverseEventQuery),
    responses(
        (status = 200, description = "Adverse events retrieved successfully", body = Vec<AdverseEvent>),
        (status = 400, description = "Unknown severity", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "views"
)]
#[get("/v1/adverse-events")]
pub async fn list_adverse_events(
    service: web::Data<RecordService>,
    query: web::Query<AdverseEventQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = adverse_event_filter(query.severity.as_deref())?;
    Ok(HttpResponse::Ok().json(service.adverse_events(&filter).await?))
}

/// Download the filtered adverse events table
#[utoipa::path(
    get,
    path = "/v1/adverse-events/export",
    params(AdverseEventQuery),
    responses(
        (status = 200, description = "CSV or XLSX attachment"),
        (status = 400, description = "Unknown severity", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "views"
)]
#[get("/v1/adverse-events/export")]
pub async fn export_adverse_events(
    service: web::Data<RecordService>,
    query: web::Query<AdverseEventQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = adverse_event_filter(query.severity.as_deref())?;
    let rows = service.adverse_events(&filter).await?;
    download(&rows, query.format, "adverse_events", "AdverseEvents")
}

/// Configure table view routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_vaccinations)
        .service(export_vaccinations)
        .service(list_contracts)
        .service(export_contracts)
        .service(list_adverse_events)
        .service(export_adverse_events);
}
