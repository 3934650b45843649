//! HTTP Server & Routing Integration Tests
//!
//! Routes: GET /health, POST /api/triage, POST /api/assess, GET /api/vehicles/:number

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use inlo_common::config::default_vehicles;
use inlo_triage::models::{AssessmentResult, Condition, Operability};
use inlo_triage::registry::StaticVehicleRegistry;
use inlo_triage::services::{
    AnalysisError, AssessmentStore, ConditionAssessor, CrashAssist, LogNotifier,
    DEGRADED_EXPLANATION,
};
use inlo_triage::workflow::{SupportDistribution, TriageWorkflow};
use inlo_triage::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Assessor that reports a damaged, immobile vehicle for any photo
struct DamagedAssessor;

impl ConditionAssessor for DamagedAssessor {
    fn assess(&self, _target: &Path, _reference: &Path) -> Result<AssessmentResult, AnalysisError> {
        Ok(AssessmentResult {
            vehicle_number: "GJ01 JY0887".to_string(),
            condition: Condition::NotGood,
            operative: Operability::No,
            same_vehicle: false,
            overall_similarity: 0.74,
            explanation: "Reference: a white car | Target: a damaged white car".to_string(),
        })
    }
}

/// Assessor whose image loading always fails
struct UnreadableAssessor;

impl ConditionAssessor for UnreadableAssessor {
    fn assess(&self, target: &Path, _reference: &Path) -> Result<AssessmentResult, AnalysisError> {
        Err(AnalysisError::NotFound(target.display().to_string()))
    }
}

fn test_app_state(
    assessor: Arc<dyn ConditionAssessor>,
    reference_image: Option<PathBuf>,
) -> AppState {
    let workflow = TriageWorkflow::new(
        Arc::new(StaticVehicleRegistry::from_entries(default_vehicles())),
        Arc::new(LogNotifier),
        SupportDistribution::default(),
    );
    AppState::new(CrashAssist::new(
        Arc::new(workflow),
        assessor,
        reference_image,
        AssessmentStore::disabled(),
    ))
}

fn default_state() -> AppState {
    test_app_state(Arc::new(DamagedAssessor), Some(PathBuf::from("/data/Good4.jpg")))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_module_and_version() {
    let app = build_router(default_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "inlo-triage");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json.get("last_error").is_none());
}

// =============================================================================
// POST /api/triage
// =============================================================================

#[tokio::test]
async fn test_triage_severe_case() {
    let app = build_router(default_state());

    let response = app
        .oneshot(post_json(
            "/api/triage",
            json!({"vehicle_number": "KA01AB1234", "inoperative": "Yes", "location": "Koramangala"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["branch"], "severe");
    assert_eq!(json["state"], "END");
    assert_eq!(
        json["response"],
        "Fatal & serious condition at Koramangala. Arrange call to police, ambulance & service agent. Email sent to owner."
    );
    assert_eq!(json["case"]["vehicle_owner"], "Shajee");
    assert_eq!(json["notification_delivered"], true);
    assert_eq!(json["notification"]["to"][0], "support@example.com");
}

#[tokio::test]
async fn test_triage_manageable_case_has_no_notification() {
    let app = build_router(default_state());

    let response = app
        .oneshot(post_json(
            "/api/triage",
            json!({"vehicle_number": "KA02CD5678", "inoperative": "No", "location": "Whitefield"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["branch"], "manageable");
    assert_eq!(
        json["response"],
        "Fatal but manageable condition at Whitefield. Arrange call to service agent only."
    );
    assert!(json.get("notification").is_none());
}

#[tokio::test]
async fn test_triage_accepts_empty_object() {
    let app = build_router(default_state());

    let response = app.oneshot(post_json("/api/triage", json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["branch"], "unclear");
    assert_eq!(
        json["response"],
        "Condition unclear: inoperative='' at Unknown. Please arrange manual assessment."
    );
}

#[tokio::test]
async fn test_triage_rejects_malformed_json() {
    let app = build_router(default_state());

    let request = Request::builder()
        .method("POST")
        .uri("/api/triage")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

// =============================================================================
// POST /api/assess
// =============================================================================

#[tokio::test]
async fn test_assess_damaged_vehicle_is_severe() {
    let app = build_router(default_state());

    let response = app
        .oneshot(post_json(
            "/api/assess",
            json!({"target_image": "/data/broken4.jpg", "location": "Surat"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["assessment"]["condition"], "not good");
    assert_eq!(json["assessment"]["operative"], "no");
    assert_eq!(json["outcome"]["branch"], "severe");
    assert_eq!(json["outcome"]["case"]["vehicle_number"], "GJ01 JY0887");
    assert_eq!(json["outcome"]["case"]["vehicle_owner"], "Shajee");
}

#[tokio::test]
async fn test_assess_failure_degrades_to_manual_assessment() {
    let state = test_app_state(
        Arc::new(UnreadableAssessor),
        Some(PathBuf::from("/data/Good4.jpg")),
    );
    let app = build_router(state);

    let response = app
        .oneshot(post_json(
            "/api/assess",
            json!({"target_image": "/missing.jpg", "vehicle_number": "KA02CD5678", "location": "Whitefield"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["assessment"]["condition"], "unknown");
    assert_eq!(json["assessment"]["explanation"], DEGRADED_EXPLANATION);
    assert!(!json["assessment"]["explanation"].as_str().unwrap().contains("/missing.jpg"));
    assert_eq!(json["outcome"]["branch"], "unclear");
    assert_eq!(json["outcome"]["case"]["vehicle_owner"], "Anand");
}

#[tokio::test]
async fn test_assess_without_reference_is_bad_request() {
    let state = test_app_state(Arc::new(DamagedAssessor), None);
    let app = build_router(state.clone());

    let response = app
        .oneshot(post_json("/api/assess", json!({"target_image": "/data/broken4.jpg"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
    assert!(state.last_error.read().await.is_some());
}

#[tokio::test]
async fn test_assess_outside_image_dir_is_bad_request() {
    let dir = tempfile::TempDir::new().unwrap();
    let workflow = TriageWorkflow::new(
        Arc::new(StaticVehicleRegistry::from_entries(default_vehicles())),
        Arc::new(LogNotifier),
        SupportDistribution::default(),
    );
    let crash_assist = CrashAssist::new(
        Arc::new(workflow),
        Arc::new(DamagedAssessor),
        Some(PathBuf::from("/data/Good4.jpg")),
        AssessmentStore::disabled(),
    )
    .with_image_dir(Some(dir.path().to_path_buf()));
    let app = build_router(AppState::new(crash_assist));

    let response = app
        .oneshot(post_json("/api/assess", json!({"target_image": "/etc/hostname"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

// =============================================================================
// GET /api/vehicles/:number
// =============================================================================

#[tokio::test]
async fn test_vehicle_lookup_normalizes_number() {
    let app = build_router(default_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/vehicles/ka01ab1234")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["vehicle_number"], "KA01AB1234");
    assert_eq!(json["owner"], "Shajee");
    assert_eq!(json["insurance"], "INS123456");
}

#[tokio::test]
async fn test_unknown_vehicle_is_not_found() {
    let app = build_router(default_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/vehicles/KA03EF9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}
