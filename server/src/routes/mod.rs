pub mod pipeline;

use axum::routing::get;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::pipeline_handlers::health;
use crate::state::AppState;
use pipeline::pipeline_routes;

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", pipeline_routes())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::pipeline::tests::{gated_pipeline, wait_for_finish};
    use crate::state::{JobStatus, RunGuard};

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn state() -> (AppState, std::sync::Arc<tokio::sync::Notify>) {
        let (pipeline, gate, _renders) = gated_pipeline();
        let state = AppState::new(pipeline, RunGuard::new(), Some("0 0 9 * * *".into()));
        (state, gate)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (state, _gate) = state();
        let (status, body) = send(build_app(state), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn trigger_conflicts_while_running() {
        let (state, _gate) = state();
        let _permit = state.guard.try_acquire().unwrap();

        let (status, body) = send(build_app(state.clone()), "POST", "/api/trigger").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());
        assert!(state.jobs.is_empty());
    }

    #[tokio::test]
    async fn trigger_then_poll() {
        let (state, gate) = state();
        let app = build_app(state.clone());

        let (status, body) = send(app.clone(), "POST", "/api/trigger").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let job_id = body["job_id"].as_str().unwrap().to_string();

        let (status, body) = send(app.clone(), "GET", &format!("/api/jobs/{job_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pending");

        let (_, body) = send(app.clone(), "GET", "/api/status").await;
        assert_eq!(body["running"], true);
        assert_eq!(body["schedule"], "0 0 9 * * *");
        assert_eq!(body["target_url"], "https://ideas.test/today");

        gate.notify_one();
        let finished = wait_for_finish(&state, job_id.parse().unwrap()).await;
        assert!(matches!(finished, JobStatus::Done { .. }));

        let (_, body) = send(app.clone(), "GET", &format!("/api/jobs/{job_id}")).await;
        assert_eq!(body["status"], "done");
        assert_eq!(body["record_id"], "record-1");

        let (_, body) = send(app, "GET", "/api/status").await;
        assert_eq!(body["running"], false);
        assert_eq!(body["last_run"]["trigger"], "manual");
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let (state, _gate) = state();
        let uri = format!("/api/jobs/{}", uuid::Uuid::new_v4());
        let (status, _) = send(build_app(state), "GET", &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
