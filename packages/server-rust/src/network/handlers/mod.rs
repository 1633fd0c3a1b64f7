//! Operational handlers served next to the API: health, liveness and
//! readiness.

pub mod health;

pub use health::{health_handler, liveness_handler, readiness_handler};

use std::sync::Arc;
use std::time::Instant;

use super::ShutdownController;
use crate::store::Backend;

/// Shared state of the operational routes.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend probed by readiness.
    pub backend: Backend,
    /// Graceful shutdown controller with health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}
