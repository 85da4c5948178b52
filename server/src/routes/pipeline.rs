use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pipeline_handlers::{poll_job, status, trigger_run};

pub fn pipeline_routes() -> Router {
    Router::new()
        .route("/trigger", post(trigger_run))
        .route("/status", get(status))
        .route("/jobs/{id}", get(poll_job))
}
