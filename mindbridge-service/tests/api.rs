use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use mindbridge_core::{InMemoryPatientStore, MentalHealthAnalyzer, SentimentAnalyzer};
use mindbridge_service::{AppState, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

const AHMAD: &str = "123456789012";

fn app() -> Router {
    build_router(AppState {
        patients: Arc::new(InMemoryPatientStore::with_demo_patients()),
        analyzer: Arc::new(MentalHealthAnalyzer::new(SentimentAnalyzer::fallback())),
    })
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_reports_healthy() {
    let (status, body) = send_json(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn patient_login_validates_ic_and_consent() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/patients/login",
        Some(json!({ "ic_number": "12345", "consent": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a valid 12-digit IC number");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/patients/login",
        Some(json!({ "ic_number": AHMAD, "consent": false })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please provide consent to proceed");

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/patients/login",
        Some(json!({ "ic_number": "000000000000", "consent": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/patients/login",
        Some(json!({ "ic_number": AHMAD, "consent": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ahmad bin Ali");
    assert_eq!(body["chat_sessions"], 0);
}

#[tokio::test]
async fn doctor_login_rejects_bad_credentials() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/doctors/login",
        Some(json!({ "username": "dr.lim", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/doctors/login",
        Some(json!({ "username": "dr.lim", "password": "demo123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome, Dr.Lim!");
}

#[tokio::test]
async fn blank_chat_message_is_rejected() {
    let (status, _) = send_json(
        &app(),
        Method::POST,
        &format!("/patients/{AHMAD}/chat"),
        Some(json!({ "message": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn crisis_chat_turn_is_stored_as_critical() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/patients/{AHMAD}/chat"),
        Some(json!({ "message": "I want to kill myself" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["risk_level"], "Critical");
    assert_eq!(body["session_index"], 1);
    assert!(body["reply"].as_str().unwrap().contains("999"));
    assert_eq!(
        body["recommendations"]["immediate_action"],
        "🚨 EMERGENCY - IMMEDIATE INTERVENTION REQUIRED"
    );

    let (status, sessions) =
        send_json(&app, Method::GET, &format!("/patients/{AHMAD}/sessions"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sessions.as_array().unwrap().len(), 1);
    assert_eq!(sessions[0]["analysis"]["risk_level"], "Critical");

    let (status, overviews) = send_json(
        &app,
        Method::GET,
        "/doctors/patients?risk_level=Critical",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overviews.as_array().unwrap().len(), 1);
    assert_eq!(overviews[0]["ic_number"], AHMAD);

    let (status, summary) = send_json(&app, Method::GET, "/doctors/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_sessions"], 1);
    assert_eq!(summary["high_risk"], 1);
    assert_eq!(summary["risk_counts"]["Not Assessed"], 2);
    assert_eq!(summary["daily_sentiment"].as_array().unwrap().len(), 1);
    assert_eq!(summary["daily_sentiment"][0]["sessions"], 1);
}

#[tokio::test]
async fn clinical_report_includes_saved_notes() {
    let app = app();

    send_json(
        &app,
        Method::POST,
        &format!("/patients/{AHMAD}/chat"),
        Some(json!({ "message": "Work is awful, I feel stressed, anxious and exhausted" })),
    )
    .await;

    let (status, _) = send_json(
        &app,
        Method::PUT,
        &format!("/doctors/patients/{AHMAD}/sessions/1/notes"),
        Some(json!({ "notes": "Follow up on workload." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, bytes) = send(
        &app,
        Method::GET,
        &format!("/doctors/patients/{AHMAD}/sessions/1/report"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let report = String::from_utf8(bytes).unwrap();
    assert!(report.contains("COMPREHENSIVE MENTAL HEALTH ASSESSMENT REPORT"));
    assert!(report.contains("Follow up on workload."));
    assert!(report.contains("- Work-related stress"));

    let (status, bytes) = send(
        &app,
        Method::GET,
        &format!("/patients/{AHMAD}/sessions/1/report"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(bytes).unwrap().contains("MINDBRIDGE MENTAL HEALTH REPORT"));
}

#[tokio::test]
async fn unknown_sessions_are_not_found() {
    let app = app();

    for uri in [
        format!("/patients/{AHMAD}/sessions/1/report"),
        format!("/patients/{AHMAD}/sessions/0/report"),
        format!("/doctors/patients/{AHMAD}/sessions/1/report"),
        "/patients/000000000000".to_string(),
    ] {
        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }

    let (status, _) = send_json(
        &app,
        Method::PUT,
        &format!("/doctors/patients/{AHMAD}/sessions/2/notes"),
        Some(json!({ "notes": "n/a" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn conversation_summary_is_not_stored() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/patients/{AHMAD}/chat/summary"),
        Some(json!({
            "messages": [
                { "role": "assistant", "content": "How are you?" },
                { "role": "user", "content": "I feel happy and great today" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["risk_level"], "Low");
    assert_eq!(body["analysis"]["source_model"], "simple-fallback");

    let (_, sessions) =
        send_json(&app, Method::GET, &format!("/patients/{AHMAD}/sessions"), None).await;
    assert!(sessions.as_array().unwrap().is_empty());
}
