mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::{ClientSettings, SiteConfig};
use crate::loader::{DemoLoader, FsProbe, StatusProbe};
use crate::registry::Registry;

/// Shared state of the site server.
#[derive(Clone)]
pub struct AppState {
    pub loader: DemoLoader,
    pub probe: Arc<dyn StatusProbe>,
    pub settings: ClientSettings,
}

impl AppState {
    /// Status checks look for demo files under `root`.
    pub fn for_site_root(loader: DemoLoader, root: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            probe: Arc::new(FsProbe::new(root)),
            settings: SiteConfig::default().client_settings(),
        }
    }

    pub fn with_settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(&self) -> &Registry {
        self.loader.registry()
    }
}

/// Registry API only, without static files.
pub fn api_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/projects", get(handlers::list_projects))
        .route("/projects/{key}", get(handlers::get_project))
        .route("/projects/{key}/status", get(handlers::get_project_status))
        .route("/status", get(handlers::list_statuses))
        .route("/settings", get(handlers::settings))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Registry API plus the static site under `root`.
pub fn create_router(state: AppState, root: impl Into<PathBuf>) -> Router {
    let site = ServeDir::new(root.into()).append_index_html_on_directories(true);
    api_router(state).fallback_service(site)
}
