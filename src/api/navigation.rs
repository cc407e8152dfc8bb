//! Page router: fixed dispatch from a navigation label to its view endpoint

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ErrorResponse};

/// The views offered by the side navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum View {
    Home,
    #[serde(rename = "Add Data")]
    AddData,
    #[serde(rename = "View Data")]
    ViewData,
    Update,
    Delete,
    Visualize,
    Map,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Home,
        View::AddData,
        View::ViewData,
        View::Update,
        View::Delete,
        View::Visualize,
        View::Map,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::AddData => "Add Data",
            View::ViewData => "View Data",
            View::Update => "Update",
            View::Delete => "Delete",
            View::Visualize => "Visualize",
            View::Map => "Map",
        }
    }

    /// Entry endpoint; the record views start from the country and selector lists
    pub fn endpoint(self) -> &'static str {
        match self {
            View::Home => "/v1/home",
            View::AddData => "/v1/countries",
            View::ViewData => "/v1/vaccinations",
            View::Update | View::Delete => "/v1/vaccinations/options",
            View::Visualize => "/v1/charts",
            View::Map => "/v1/map",
        }
    }

    /// Resolve a label, ignoring case and surrounding whitespace
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|view| view.label().eq_ignore_ascii_case(label))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NavigationEntry {
    pub view: View,
    pub endpoint: String,
}

/// List the navigation entries in menu order
#[utoipa::path(
    get,
    path = "/v1/navigation",
    responses(
        (status = 200, description = "Navigation entries", body = Vec<NavigationEntry>)
    ),
    tag = "navigation"
)]
#[get("/v1/navigation")]
pub async fn list_views() -> HttpResponse {
    let entries: Vec<NavigationEntry> = View::ALL
        .into_iter()
        .map(|view| NavigationEntry {
            view,
            endpoint: view.endpoint().to_string(),
        })
        .collect();
    HttpResponse::Ok().json(entries)
}

/// Redirect to the endpoint behind a navigation label
#[utoipa::path(
    get,
    path = "/v1/navigation/{label}",
    params(
        ("label" = String, Path, description = "Navigation label, e.g. Map or View Data")
    ),
    responses(
        (status = 307, description = "Redirect to the view endpoint"),
        (status = 404, description = "Unknown label", body = ErrorResponse)
    ),
    tag = "navigation"
)]
#[get("/v1/navigation/{label}")]
pub async fn navigate(path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let view = View::from_label(&path)
        .ok_or_else(|| ApiError::NotFound(format!("No view named {}", path.as_str())))?;

    tracing::debug!(view = view.label(), endpoint = view.endpoint(), "Navigating");

    Ok(HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, view.endpoint()))
        .finish())
}

/// Configure navigation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_views).service(navigate);
}
