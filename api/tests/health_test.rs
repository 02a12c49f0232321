mod helpers;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use helpers::app::make_test_app;
use serde_json::Value;
use serial_test::serial;
use tower::ServiceExt;

#[tokio::test]
#[serial]
async fn health_check_passes() {
    let (app, _db) = make_test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], "OK");
    assert_eq!(json["message"], "Health check passed");
}
