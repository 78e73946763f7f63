use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::AppState;
use crate::config::ClientSettings;
use crate::loader::DemoStatus;
use crate::models::ProjectDescriptor;

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn settings(State(state): State<AppState>) -> Json<ClientSettings> {
    Json(state.settings.clone())
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<ProjectDescriptor>> {
    Json(state.registry().all().to_vec())
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ProjectDescriptor>, (StatusCode, String)> {
    state
        .registry()
        .get(&key)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Project not found".to_string()))
}

// ============================================================
// Demo status
// ============================================================

pub async fn get_project_status(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DemoStatus>, (StatusCode, String)> {
    if !state.registry().contains(&key) {
        return Err((StatusCode::NOT_FOUND, "Project not found".to_string()));
    }
    Ok(Json(state.loader.get_status(&key, state.probe.as_ref()).await))
}

pub async fn list_statuses(State(state): State<AppState>) -> Json<Vec<DemoStatus>> {
    let mut statuses = Vec::with_capacity(state.registry().len());
    for key in state.registry().keys() {
        statuses.push(state.loader.get_status(key, state.probe.as_ref()).await);
    }
    Json(statuses)
}
