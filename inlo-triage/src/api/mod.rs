//! HTTP API handlers for inlo-triage

pub mod health;
pub mod triage;

pub use health::health_routes;
pub use triage::triage_routes;
