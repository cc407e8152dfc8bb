//! REST API endpoints for the Visualize view

use actix_web::{HttpResponse, get, web};

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{ChartData, ChartId, ChartSummary};
use crate::service::ChartService;

/// List the available charts
#[utoipa::path(
    get,
    path = "/v1/charts",
    responses(
        (status = 200, description = "Chart index", body = Vec<ChartSummary>)
    ),
    tag = "charts"
)]
#[get("/v1/charts")]
pub async fn list_charts() -> HttpResponse {
    let charts: Vec<ChartSummary> = ChartId::ALL.into_iter().map(ChartSummary::from).collect();
    HttpResponse::Ok().json(charts)
}

/// Data for one chart
#[utoipa::path(
    get,
    path = "/v1/charts/{id}",
    params(
        ("id" = String, Path, description = "Chart slug, e.g. revenue-by-country")
    ),
    responses(
        (status = 200, description = "Chart data", body = ChartData),
        (status = 404, description = "Unknown chart", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse)
    ),
    tag = "charts"
)]
#[get("/v1/charts/{id}")]
pub async fn get_chart(
    service: web::Data<ChartService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id: ChartId = path.parse().map_err(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(service.chart(id).await?))
}

/// Configure chart routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_charts).service(get_chart);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use actix_web::{App, http::StatusCode, test};

    fn offline() -> web::Data<ChartService> {
        web::Data::new(ChartService::new(Store::Unavailable {
            reason: "connection refused".to_string(),
        }))
    }

    #[actix_web::test]
    async fn test_index_lists_every_chart() {
        let app = test::init_service(App::new().app_data(offline()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/v1/charts").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let charts = body.as_array().unwrap();
        assert_eq!(charts.len(), ChartId::ALL.len());
        assert_eq!(charts[0]["path"], "/v1/charts/revenue-by-country");
    }

    #[actix_web::test]
    async fn test_unknown_chart_is_404() {
        let app = test::init_service(App::new().app_data(offline()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/v1/charts/pie-of-pies").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/v1/charts/busiest-days").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
