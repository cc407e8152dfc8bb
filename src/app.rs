//! Application state and service initialization
//!
//! This module centralizes service construction so handlers receive their
//! dependencies through `web::Data`.

use std::sync::Arc;

use actix_web::web;

use crate::db::Store;
use crate::model::{Config, ViewConfig};
use crate::service::{ChartService, GeoReference, MapService, RecordService};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Store handle, possibly degraded
    pub store: web::Data<Store>,
    /// Boundary dataset shared by the map view and readiness probe
    pub geo: web::Data<GeoReference>,
    pub views: web::Data<ViewConfig>,
    pub records: web::Data<RecordService>,
    pub charts: web::Data<ChartService>,
    pub map: web::Data<MapService>,
}

impl AppState {
    /// Open the store and build the service graph
    ///
    /// A store that cannot be reached does not stop start-up; store-backed
    /// endpoints report it instead.
    pub async fn new(config: &Config) -> Self {
        let store = Store::open(&config.database).await;
        Self::with_store(store, config)
    }

    pub fn with_store(store: Store, config: &Config) -> Self {
        let geo = Arc::new(GeoReference::new(config.map.geojson_path.clone()));

        Self {
            records: web::Data::new(RecordService::new(store.clone())),
            charts: web::Data::new(ChartService::new(store.clone())),
            map: web::Data::new(MapService::new(store.clone(), Arc::clone(&geo))),
            store: web::Data::new(store),
            geo: web::Data::from(geo),
            views: web::Data::new(config.views.clone()),
        }
    }

    /// Register every shared resource on an app
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.store.clone())
            .app_data(self.geo.clone())
            .app_data(self.views.clone())
            .app_data(self.records.clone())
            .app_data(self.charts.clone())
            .app_data(self.map.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};

    #[actix_web::test]
    async fn test_degraded_app_serves_every_route() {
        let state = AppState::with_store(
            Store::Unavailable {
                reason: "connection refused".to_string(),
            },
            &Config::default(),
        );
        let app = test::init_service(
            App::new()
                .configure(|cfg| state.register(cfg))
                .configure(crate::api::configure),
        )
        .await;

        let cases = [
            ("/health/live", StatusCode::OK),
            ("/health/ready", StatusCode::SERVICE_UNAVAILABLE),
            ("/v1/home", StatusCode::OK),
            ("/v1/contracts", StatusCode::SERVICE_UNAVAILABLE),
            ("/v1/charts/monthly-trend", StatusCode::SERVICE_UNAVAILABLE),
            ("/v1/map", StatusCode::SERVICE_UNAVAILABLE),
            ("/v1/navigation/Visualize", StatusCode::TEMPORARY_REDIRECT),
            ("/openapi.json", StatusCode::OK),
        ];
        for (uri, expected) in cases {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected, "{}", uri);
        }
    }
}
