use axum::{extract::Path, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::state::{AppState, JobStatus, RunSummary, Trigger};

#[derive(Serialize)]
pub struct JobCreated {
    pub job_id: Uuid,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub schedule: Option<String>,
    pub target_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<RunSummary>,
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// POST /api/trigger
pub async fn trigger_run(Extension(state): Extension<AppState>) -> impl IntoResponse {
    match state.try_start_run(Trigger::Manual) {
        Some(job_id) => (StatusCode::ACCEPTED, Json(json!(JobCreated { job_id }))),
        None => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "A run is already in progress" })),
        ),
    }
}

/// GET /api/jobs/{id}
pub async fn poll_job(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.jobs.get(&id) {
        Some(status) => {
            let status: JobStatus = status.value().clone();
            (StatusCode::OK, Json(json!(status)))
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "Job not found" }))),
    }
}

/// GET /api/status
pub async fn status(Extension(state): Extension<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        running: state.guard.is_running(),
        schedule: state.schedule.clone(),
        target_url: state.pipeline.target_url().to_string(),
        last_run: state.last_run(),
    })
}
