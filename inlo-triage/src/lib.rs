//! inlo-triage library interface
//!
//! Crash-assist triage: condition assessment of a vehicle photo, followed by a
//! deterministic workflow that routes the case to police/ambulance dispatch,
//! service-agent dispatch, or manual assessment.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod services;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::services::CrashAssist;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub crash_assist: Arc<CrashAssist>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(crash_assist: CrashAssist) -> Self {
        Self {
            crash_assist: Arc::new(crash_assist),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::triage_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
