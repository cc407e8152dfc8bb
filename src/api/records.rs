//! REST API endpoints for the Add Data, Update and Delete views

use actix_web::{HttpResponse, delete, get, patch, post, web};

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{
    Country, NewAdverseEvent, NewContract, NewVaccination, PriceUpdate, RecordOption,
    ResolvedUpdate, VaccineTypeUpdate,
};
use crate::service::RecordService;

/// List the countries a record can reference
#[utoipa::path(
    get,
    path = "/v1/countries",
    responses(
        (status = 200, description = "Countries retrieved successfully", body = Vec<Country>),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "records"
)]
#[get("/v1/countries")]
pub async fn list_countries(service: web::Data<RecordService>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.countries().await?))
}

/// Record a vaccination
#[utoipa::path(
    post,
    path = "/v1/vaccinations",
    request_body = NewVaccination,
    responses(
        (status = 201, description = "Vaccination recorded"),
        (status = 400, description = "Invalid form or unknown country", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "records"
)]
#[post("/v1/vaccinations")]
pub async fn create_vaccination(
    service: web::Data<RecordService>,
    form: web::Json<NewVaccination>,
) -> Result<HttpResponse, ApiError> {
    service.add_vaccination(form.into_inner()).await?;
    Ok(HttpResponse::Created().finish())
}

/// Record a supply contract
#[utoipa::path(
    post,
    path = "/v1/contracts",
    request_body = NewContract,
    responses(
        (status = 201, description = "Contract recorded"),
        (status = 400, description = "Invalid form or unknown country", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "records"
)]
#[post("/v1/contracts")]
pub async fn create_contract(
    service: web::Data<RecordService>,
    form: web::Json<NewContract>,
) -> Result<HttpResponse, ApiError> {
    service.add_contract(form.into_inner()).await?;
    Ok(HttpResponse::Created().finish())
}

/// Record an adverse event
#[utoipa::path(
    post,
    path = "/v1/adverse-events",
    request_body = NewAdverseEvent,
    responses(
        (status = 201, description = "Adverse event recorded"),
        (status = 400, description = "Invalid form, unknown country or unknown vaccination", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "records"
)]
#[post("/v1/adverse-events")]
pub async fn create_adverse_event(
    service: web::Data<RecordService>,
    form: web::Json<NewAdverseEvent>,
) -> Result<HttpResponse, ApiError> {
    service.add_adverse_event(form.into_inner()).await?;
    Ok(HttpResponse::Created().finish())
}

/// Selector entries for vaccination records
#[utoipa::path(
    get,
    path = "/v1/vaccinations/options",
    responses(
        (status = 200, description = "Options retrieved successfully", body = Vec<RecordOption>),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "records"
)]
#[get("/v1/vaccinations/options")]
pub async fn vaccination_options(
    service: web::Data<RecordService>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.vaccination_options().await?))
}

/// Selector entries for contracts
#[utoipa::path(
    get,
    path = "/v1/contracts/options",
    responses(
        (status = 200, description = "Options retrieved successfully", body = Vec<RecordOption>),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "records"
)]
#[get("/v1/contracts/options")]
pub async fn contract_options(service: web::Data<RecordService>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.contract_options().await?))
}

/// Selector entries for adverse events
#[utoipa::path(
    get,
    path = "/v1/adverse-events/options",
    responses(
        (status = 200, description = "Options retrieved successfully", body = Vec<RecordOption>),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "records"
)]
#[get("/v1/adverse-events/options")]
pub async fn adverse_event_options(
    service: web::Data<RecordService>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.adverse_event_options().await?))
}

/// Change the vaccine type of a vaccination record
#[utoipa::path(
    patch,
    path = "/v1/vaccinations/{id}",
    params(("id" = i32, Path, description = "Vaccination ID")),
    request_body = VaccineTypeUpdate,
    responses(
        (status = 204, description = "Vaccination updated"),
        (status = 400, description = "Empty vaccine type", body = ErrorResponse),
        (status = 404, description = "Vaccination not found", body = ErrorResponse)
    ),
    tag = "records"
)]
#[patch("/v1/vaccinations/{id}")]
pub async fn update_vaccination(
    service: web::Data<RecordService>,
    path: web::Path<i32>,
    body: web::Json<VaccineTypeUpdate>,
) -> Result<HttpResponse, ApiError> {
    service
        .update_vaccine_type(path.into_inner(), &body.vaccine_type)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change the price per dose of a contract
#[utoipa::path(
    patch,
    path = "/v1/contracts/{id}",
    params(("id" = i32, Path, description = "Contract ID")),
    request_body = PriceUpdate,
    responses(
        (status = 204, description = "Contract updated"),
        (status = 400, description = "Negative price", body = ErrorResponse),
        (status = 404, description = "Contract not found", body = ErrorResponse)
    ),
    tag = "records"
)]
#[patch("/v1/contracts/{id}")]
pub async fn update_contract(
    service: web::Data<RecordService>,
    path: web::Path<i32>,
    body: web::Json<PriceUpdate>,
) -> Result<HttpResponse, ApiError> {
    service
        .update_contract_price(path.into_inner(), body.price_per_dose)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mark an adverse event resolved or unresolved
#[utoipa::path(
    patch,
    path = "/v1/adverse-events/{id}",
    params(("id" = i32, Path, description = "Adverse event ID")),
    request_body = ResolvedUpdate,
    responses(
        (status = 204, description = "Adverse event updated"),
        (status = 404, description = "Adverse event not found", body = ErrorResponse)
    ),
    tag = "records"
)]
#[patch("/v1/adverse-events/{id}")]
pub async fn update_adverse_event(
    service: web::Data<RecordService>,
    path: web::Path<i32>,
    body: web::Json<ResolvedUpdate>,
) -> Result<HttpResponse, ApiError> {
    service
        .update_event_resolved(path.into_inner(), body.resolved)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a vaccination record
#[utoipa::path(
    delete,
    path = "/v1/vaccinations/{id}",
    params(("id" = i32, Path, description = "Vaccination ID")),
    responses(
        (status = 204, description = "Vaccination deleted"),
        (status = 404, description = "Vaccination not found", body = ErrorResponse),
        (status = 409, description = "Vaccination has adverse events", body = ErrorResponse)
    ),
    tag = "records"
)]
#[delete("/v1/vaccinations/{id}")]
pub async fn delete_vaccination(
    service: web::Data<RecordService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    service.delete_vaccination(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a contract
#[utoipa::path(
    delete,
    path = "/v1/contracts/{id}",
    params(("id" = i32, Path, description = "Contract ID")),
    responses(
        (status = 204, description = "Contract deleted"),
        (status = 404, description = "Contract not found", body = ErrorResponse),
        (status = 409, description = "Contract has shipments", body = ErrorResponse)
    ),
    tag = "records"
)]
#[delete("/v1/contracts/{id}")]
pub async fn delete_contract(
    service: web::Data<RecordService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    service.delete_contract(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete an adverse event
#[utoipa::path(
    delete,
    path = "/v1/adverse-events/{id}",
    params(("id" = i32, Path, description = "Adverse event ID")),
    responses(
        (status = 204, description = "Adverse event deleted"),
        (status = 404, description = "Adverse event not found", body = ErrorResponse)
    ),
    tag = "records"
)]
#[delete("/v1/adverse-events/{id}")]
pub async fn delete_adverse_event(
    service: web::Data<RecordService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    service.delete_adverse_event(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure record form routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_countries)
        .service(create_vaccination)
        .service(create_contract)
        .service(create_adverse_event)
        .service(vaccination_options)
        .service(contract_options)
        .service(adverse_event_options)
        .service(update_vaccination)
        .service(update_contract)
        .service(update_adverse_event)
        .service(delete_vaccination)
        .service(delete_contract)
        .service(delete_adverse_event);
}
