//! REST API endpoints for the coverage map

use actix_web::{HttpResponse, get, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::error::{ApiError, ErrorResponse};
use crate::api::views::attachment;
use crate::model::DateRange;
use crate::service::export::{ExportFormat, export};
use crate::service::map::CoverageMap;
use crate::service::MapService;

const EXPORT_SHEET: &str = "VaccinationData";

/// Query parameters for the map and its export
#[derive(Debug, Deserialize, IntoParams)]
pub struct MapQuery {
    /// Count second doses on or before this date (YYYY-MM-DD, default: latest on record)
    pub until: Option<NaiveDate>,
    /// Download format for the export endpoint (csv or xlsx, default: csv)
    pub format: Option<ExportFormat>,
}

/// Earliest and latest administration dates, bounding the `until` picker
#[utoipa::path(
    get,
    path = "/v1/map/date-range",
    responses(
        (status = 200, description = "Date range retrieved successfully", body = DateRange),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "map"
)]
#[get("/v1/map/date-range")]
pub async fn date_range(service: web::Data<MapService>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.date_range().await?))
}

/// Coverage rows and painted country boundaries
#[utoipa::path(
    get,
    path = "/v1/map",
    params(MapQuery),
    responses(
        (status = 200, description = "Coverage map", body = CoverageMap),
        (status = 400, description = "Date outside the recorded range", body = ErrorResponse),
        (status = 500, description = "Boundary dataset unreadable", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "map"
)]
#[get("/v1/map")]
pub async fn coverage_map(
    service: web::Data<MapService>,
    query: web::Query<MapQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.render(query.until).await?))
}

/// Download the coverage rows shown on the map
#[utoipa::path(
    get,
    path = "/v1/map/export",
    params(MapQuery),
    responses(
        (status = 200, description = "CSV or XLSX attachment"),
        (status = 400, description = "Date outside the recorded range", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "map"
)]
#[get("/v1/map/export")]
pub async fn export_coverage(
    service: web::Data<MapService>,
    query: web::Query<MapQuery>,
) -> Result<HttpResponse, ApiError> {
    let (until, rows) = service.coverage(query.until).await?;
    let stem = format!("vaccination_data_until_{}", until.format("%Y-%m-%d"));
    let download = export(&rows, query.format.unwrap_or_default(), &stem, EXPORT_SHEET)?;
    Ok(attachment(download))
}

/// Configure map routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(date_range)
        .service(coverage_map)
        .service(export_coverage);
}
