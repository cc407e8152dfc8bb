//! Health check endpoints for Kubernetes liveness and readiness probes

use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::Store;
use crate::service::GeoReference;

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessStatus {
    pub status: String,
    pub version: String,
    pub dependencies: DependencyHealth,
}

#[derive(Serialize, ToSchema)]
pub struct DependencyHealth {
    pub database: String,
    pub geo_reference: String,
}

/// Liveness probe endpoint
///
/// Always returns 200 OK if the service is running.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/health/live")]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness probe endpoint
///
/// Returns 200 OK when the store answers a round trip. A missing boundary
/// file only affects the map and is reported without failing readiness.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessStatus),
        (status = 503, description = "Service is not ready", body = ReadinessStatus)
    ),
    tag = "health"
)]
#[get("/health/ready")]
pub async fn readiness(store: web::Data<Store>, geo: web::Data<GeoReference>) -> impl Responder {
    let db_status = match store.gateway() {
        Ok(gateway) => match gateway.ping().await {
            Ok(()) => {
                tracing::debug!("Database health check passed");
                "healthy"
            }
            Err(e) => {
                tracing::error!(error = %e, "Database health check failed");
                "unhealthy"
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Database unavailable since start-up");
            "unavailable"
        }
    };

    let geo_status = if geo.path().exists() {
        "present"
    } else {
        "missing"
    };

    let all_healthy = db_status == "healthy";

    let status = ReadinessStatus {
        status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dependencies: DependencyHealth {
            database: db_status.to_string(),
            geo_reference: geo_status.to_string(),
        },
    };

    if all_healthy {
        HttpResponse::Ok().json(status)
    } else {
        HttpResponse::ServiceUnavailable().json(status)
    }
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness).service(readiness);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};

    #[actix_web::test]
    async fn test_liveness() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/health/live").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_readiness_fails_without_store() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Store::Unavailable {
                    reason: "connection refused".to_string(),
                }))
                .app_data(web::Data::new(GeoReference::new("/nowhere/countries.geojson")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health/ready").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "not_ready");
        assert_eq!(body["dependencies"]["database"], "unavailable");
        assert_eq!(body["dependencies"]["geo_reference"], "missing");
    }
}
