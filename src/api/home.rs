//! Landing view: record counts and store status

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::db::{DbError, Store};
use crate::model::RecordCounts;
use crate::service::{RecordError, RecordService};

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeStatus {
    pub title: String,
    pub version: String,
    /// `connected` or `unavailable`
    pub store: String,
    /// Why the store could not be reached at start-up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<String>,
    /// Absent while the store is unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<RecordCounts>,
}

/// Record counts for the landing page
///
/// Answers 200 in degraded mode so the landing page can explain the outage.
#[utoipa::path(
    get,
    path = "/v1/home",
    responses(
        (status = 200, description = "Landing page status", body = HomeStatus),
        (status = 500, description = "Count query failed")
    ),
    tag = "home"
)]
#[get("/v1/home")]
pub async fn home(
    store: web::Data<Store>,
    records: web::Data<RecordService>,
) -> Result<HttpResponse, ApiError> {
    let counts = match records.counts().await {
        Ok(counts) => Some(counts),
        Err(RecordError::Db(DbError::Unavailable(_))) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Ok().json(HomeStatus {
        title: "mRNA BioPharma Analytics".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if store.is_connected() {
            "connected"
        } else {
            "unavailable"
        }
        .to_string(),
        store_error: store.unavailable_reason().map(str::to_string),
        counts,
    }))
}

/// Configure landing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn test_home_explains_degraded_store() {
        let store = Store::Unavailable {
            reason: "connection refused".to_string(),
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .app_data(web::Data::new(RecordService::new(store)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/v1/home").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["store"], "unavailable");
        assert_eq!(body["store_error"], "connection refused");
        assert!(body.get("counts").is_none());
    }
}
