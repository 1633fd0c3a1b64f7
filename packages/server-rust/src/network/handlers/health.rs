//! `/health`, `/health/live` and `/health/ready`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use super::AppState;
use crate::network::HealthState;

/// Status document for operators. Answers 200 in every phase; callers read
/// `state` to see whether the API is taking work.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": "ichor",
        "version": env!("CARGO_PKG_VERSION"),
        "state": state.shutdown.health_state().as_str(),
        "storage": state.backend.name(),
        "in_flight": state.shutdown.in_flight_count(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// The process is up. Postgres is deliberately not consulted here.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// 200 while the listener is `Ready` and storage answers a status check,
/// 503 otherwise.
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    let phase = state.shutdown.health_state();
    if phase != HealthState::Ready {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    if let Err(e) = state.backend.status_check().await {
        warn!(error = %e, storage = state.backend.name(), "storage not ready");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use super::*;
    use crate::network::ShutdownController;
    use crate::store::Backend;

    fn memory_state() -> AppState {
        AppState {
            backend: Backend::Memory,
            shutdown: Arc::new(ShutdownController::new()),
            start_time: Instant::now(),
        }
    }

    #[tokio::test]
    async fn status_document_describes_the_server() {
        let state = memory_state();
        state.shutdown.set_ready();
        let _request = state.shutdown.in_flight_guard();

        let Json(doc) = health_handler(State(state)).await;
        assert_eq!(doc["service"], "ichor");
        assert_eq!(doc["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(doc["state"], "ready");
        assert_eq!(doc["storage"], "memory");
        assert_eq!(doc["in_flight"], 1);
        assert!(doc["uptime_secs"].as_u64().is_some());
    }

    #[tokio::test]
    async fn live_even_while_draining() {
        let state = memory_state();
        state.shutdown.trigger_shutdown();
        assert_eq!(liveness_handler().await, StatusCode::OK);

        let Json(doc) = health_handler(State(state)).await;
        assert_eq!(doc["state"], "draining");
    }

    #[tokio::test]
    async fn ready_only_between_startup_and_shutdown() {
        let state = memory_state();
        let probe = || readiness_handler(State(state.clone()));

        assert_eq!(probe().await, StatusCode::SERVICE_UNAVAILABLE);
        state.shutdown.set_ready();
        assert_eq!(probe().await, StatusCode::OK);
        state.shutdown.trigger_shutdown();
        assert_eq!(probe().await, StatusCode::SERVICE_UNAVAILABLE);
    }
}
