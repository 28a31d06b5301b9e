use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::coop::router::coop_router;
use crate::workflows::coop::service::CoopProgramService;

fn build_router() -> (
    axum::Router,
    Arc<CoopProgramService<MemoryStore, MemoryNotifier>>,
    Arc<MemoryStore>,
) {
    let store = Arc::new(MemoryStore::default());
    seed_directory(&store);
    let notifier = Arc::new(MemoryNotifier::default());
    let service = Arc::new(CoopProgramService::new(
        store.clone(),
        notifier,
        eligibility_config(),
    ));
    (coop_router(service.clone()), service, store)
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn eligibility_endpoint_returns_verdict() {
    let (router, _, _) = build_router();

    let response = router
        .oneshot(post_json(
            "/api/v1/coop/students/STU-2025-0001/eligibility",
            json!({}),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload.get("verdict"), Some(&json!("eligible")));
    assert_eq!(payload.get("failed_metrics"), Some(&json!([])));
}

#[tokio::test]
async fn eligibility_endpoint_maps_unknown_student_to_404() {
    let (router, _, _) = build_router();

    let response = router
        .oneshot(post_json(
            "/api/v1/coop/students/STU-2025-9999/eligibility",
            json!({}),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn application_endpoints_drive_the_selection_workflow() {
    let (router, _, _) = build_router();

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/coop/applications",
            json!({
                "student_id": "STU-2025-0001",
                "posting_id": "POS-2025-0001",
            }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json(response).await;
    let application_id = payload
        .get("application_id")
        .and_then(Value::as_str)
        .expect("application id")
        .to_string();
    assert_eq!(payload.get("status"), Some(&json!("pending")));

    // Wrong employer is turned away before the state machine is consulted.
    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/coop/applications/{application_id}/select"),
            json!({ "employer_id": "EMP-2025-0002" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/coop/applications/{application_id}/select"),
            json!({ "employer_id": "EMP-2025-0001" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload.get("status"), Some(&json!("selected")));

    // Second click on an already-decided application.
    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/coop/applications/{application_id}/select"),
            json!({ "employer_id": "EMP-2025-0001" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .oneshot(get(&format!("/api/v1/coop/applications/{application_id}")))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload.get("status"), Some(&json!("selected")));
}

#[tokio::test]
async fn record_endpoints_cover_summary_approval_and_grading() {
    let (router, service, store) = build_router();
    let student = eligible_student();
    let application = service
        .apply_to_posting(&student.id, &controls_posting().id)
        .expect("application created");
    service
        .select_applicant(&robotics_employer().id, &application.id)
        .expect("selection succeeds");
    let record = store
        .coop_record_for_application(&application.id)
        .expect("record created");

    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/coop/records/{}/summary", record.id.0),
            json!({
                "student_id": student.id.0,
                "content": "Hardware-in-the-loop test campaign.",
            }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload.get("status"), Some(&json!("summary_submitted")));
    assert_eq!(payload.get("summary_submitted"), Some(&json!(true)));

    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/coop/records/{}/approve", record.id.0),
            json!({ "faculty_id": "FAC-2025-0001" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    // Grades outside A-E never reach the service.
    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/coop/records/{}/grade", record.id.0),
            json!({ "faculty_id": "FAC-2025-0001", "grade": "F" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/coop/records/{}/grade", record.id.0),
            json!({ "faculty_id": "FAC-2025-0001", "grade": "A" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload.get("status"), Some(&json!("graded")));
    assert_eq!(payload.get("grade"), Some(&json!("A")));
}

#[tokio::test]
async fn faculty_endpoints_expose_scoped_views() {
    let (router, _, _) = build_router();

    let response = router
        .clone()
        .oneshot(get("/api/v1/coop/faculty/FAC-2025-0001/students"))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let students = payload.as_array().expect("array payload");
    assert_eq!(students.len(), 2);

    let response = router
        .oneshot(get("/api/v1/coop/faculty/FAC-2025-0001/report"))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload.get("students_in_department"), Some(&json!(2)));
    assert_eq!(payload.get("coop_students"), Some(&json!(0)));
}
