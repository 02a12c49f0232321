mod helpers;

use api::auth::{Role, generate_jwt};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use db::lifecycle;
use db::lifecycle::task::ReviewDecision;
use db::models::{
    student::{self, Model as Student},
    supervisor::{self, Model as Supervisor},
    task::Model as Task,
};
use helpers::app::make_test_app;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;

async fn seed_pair(db: &DatabaseConnection) -> (supervisor::Model, student::Model) {
    let sup = Supervisor::create(db, "ana.joubert@uni.ac.za", "Ana", "Joubert")
        .await
        .unwrap();
    let stu = Student::create(
        db,
        "u20000001",
        "Thabo",
        "Nkosi",
        "thabo.nkosi@uni.ac.za",
        Some(sup.id),
    )
    .await
    .unwrap();
    lifecycle::project::create_for_student(db, stu.id, sup.id, "Thesis", "Final year project")
        .await
        .unwrap();
    (sup, stu)
}

async fn assign_one(db: &DatabaseConnection, supervisor_id: i64) -> Task {
    lifecycle::task::assign_task_to_students(
        db,
        supervisor_id,
        "Literature review",
        "Survey the field",
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap()
    .remove(0)
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
#[serial]
async fn student_endpoints_require_a_student_token() {
    let (app, db) = make_test_app().await;
    let (sup, _) = seed_pair(&db).await;
    let (supervisor_token, _) = generate_jwt(sup.id, Role::Supervisor);

    let unauthenticated = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/students/tasks")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

    let wrong_role = app
        .clone()
        .oneshot(get("/api/students/tasks", &supervisor_token))
        .await
        .unwrap();
    assert_eq!(wrong_role.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn submitting_a_pending_task_moves_it_under_review() {
    let (app, db) = make_test_app().await;
    let (sup, stu) = seed_pair(&db).await;
    let task = assign_one(&db, sup.id).await;
    let (token, _) = generate_jwt(stu.id, Role::Student);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/students/tasks/{}/submit", task.id),
            &token,
            json!({
                "link": "https://github.com/u20000001/literature-review",
                "short_description": "First full draft"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Task submitted successfully");
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["task_id"], task.id);

    let under_review = app
        .clone()
        .oneshot(get("/api/students/tasks/under-review", &token))
        .await
        .unwrap();
    assert_eq!(under_review.status(), StatusCode::OK);
    let list = body_json(under_review).await;
    assert_eq!(list["data"][0]["id"], task.id);
    assert_eq!(list["data"][0]["status"], "Under Review");
}

#[tokio::test]
#[serial]
async fn submitting_a_missing_task_is_not_found() {
    let (app, db) = make_test_app().await;
    let (_, stu) = seed_pair(&db).await;
    let (token, _) = generate_jwt(stu.id, Role::Student);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/students/tasks/999/submit",
            &token,
            json!({ "link": "https://example.com", "short_description": "draft" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Pending task not found for this student");
}

#[tokio::test]
#[serial]
async fn status_filtered_lists_report_404_when_empty() {
    let (app, db) = make_test_app().await;
    let (_, stu) = seed_pair(&db).await;
    let (token, _) = generate_jwt(stu.id, Role::Student);

    let response = app
        .clone()
        .oneshot(get("/api/students/tasks/completed", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "No completed tasks found for this student");

    // The unfiltered overview list stays 200 with an empty array.
    let overview = app
        .clone()
        .oneshot(get("/api/students/tasks", &token))
        .await
        .unwrap();
    assert_eq!(overview.status(), StatusCode::OK);
    let json = body_json(overview).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
#[serial]
async fn dashboard_series_always_has_six_zero_filled_months() {
    let (app, db) = make_test_app().await;
    let (sup, stu) = seed_pair(&db).await;
    assign_one(&db, sup.id).await;
    let (token, _) = generate_jwt(stu.id, Role::Student);

    let response = app
        .clone()
        .oneshot(get("/api/students/dashboard-stats", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let metrics = json["data"]["tasks_metrics"].as_array().unwrap();
    assert_eq!(metrics.len(), 6);
    for entry in metrics {
        let counts = &entry["counts"];
        for key in ["pending", "under_review", "completed", "rejected"] {
            assert!(counts[key].is_i64(), "missing status key {}", key);
        }
        assert!(entry["month"].as_str().unwrap().contains(' '));
    }
    // The current month sits last and carries the freshly assigned task.
    assert_eq!(metrics[5]["counts"]["pending"], 1);
    assert_eq!(json["data"]["tasks_status"]["pending"], 1);
}

#[tokio::test]
#[serial]
async fn project_view_reports_completion_percentage() {
    let (app, db) = make_test_app().await;
    let (sup, stu) = seed_pair(&db).await;
    let task = assign_one(&db, sup.id).await;
    lifecycle::task::submit_task(&db, stu.id, task.id, "https://example.com", "draft")
        .await
        .unwrap();
    lifecycle::task::review_task(&db, sup.id, stu.id, task.id, ReviewDecision::Approved, "Good")
        .await
        .unwrap();
    let (token, _) = generate_jwt(stu.id, Role::Student);

    let response = app
        .clone()
        .oneshot(get("/api/students/project", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["project_title"], "Thesis");
    assert_eq!(json["data"]["project_status"], "In Progress");
    assert_eq!(json["data"]["completion_percentage"], 100);
}

#[tokio::test]
#[serial]
async fn project_hand_in_is_forbidden_until_all_five_tasks_are_completed() {
    let (app, db) = make_test_app().await;
    let (sup, stu) = seed_pair(&db).await;
    let (token, _) = generate_jwt(stu.id, Role::Student);

    // Five tasks, four approved, one still pending.
    for _ in 0..5 {
        assign_one(&db, sup.id).await;
    }
    let tasks = Task::get_by_student(&db, stu.id).await.unwrap();
    for task in tasks.iter().take(4) {
        lifecycle::task::submit_task(&db, stu.id, task.id, "https://example.com", "draft")
            .await
            .unwrap();
        lifecycle::task::review_task(&db, sup.id, stu.id, task.id, ReviewDecision::Approved, "Good")
            .await
            .unwrap();
    }

    let blocked = app
        .clone()
        .oneshot(post_json(
            "/api/students/submit-project",
            &token,
            json!({ "final_project_link": "https://github.com/u20000001/thesis" }),
        ))
        .await
        .unwrap();
    assert_eq!(blocked.status(), StatusCode::FORBIDDEN);

    // Complete the fifth task and the gate opens.
    let last = &tasks[4];
    lifecycle::task::submit_task(&db, stu.id, last.id, "https://example.com", "final")
        .await
        .unwrap();
    lifecycle::task::review_task(&db, sup.id, stu.id, last.id, ReviewDecision::Approved, "Done")
        .await
        .unwrap();

    let allowed = app
        .clone()
        .oneshot(post_json(
            "/api/students/submit-project",
            &token,
            json!({ "final_project_link": "https://github.com/u20000001/thesis" }),
        ))
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    let json = body_json(allowed).await;
    assert_eq!(json["data"]["status"], "Completed");
    assert_eq!(
        json["data"]["final_project_link"],
        "https://github.com/u20000001/thesis"
    );
    assert_eq!(json["data"]["progress"], 100);

    // The closed project now shows up in the gallery.
    let gallery = app
        .clone()
        .oneshot(get("/api/students/all-projects", &token))
        .await
        .unwrap();
    assert_eq!(gallery.status(), StatusCode::OK);
    let json = body_json(gallery).await;
    assert_eq!(json["data"][0]["status"], "Completed");
    assert_eq!(json["data"][0]["student"]["matric_number"], "u20000001");
}

#[tokio::test]
#[serial]
async fn notifications_feed_tracks_reads() {
    let (app, db) = make_test_app().await;
    let (sup, stu) = seed_pair(&db).await;
    assign_one(&db, sup.id).await;
    let (token, _) = generate_jwt(stu.id, Role::Student);

    let unread = app
        .clone()
        .oneshot(get("/api/students/notifications/unread-count", &token))
        .await
        .unwrap();
    let json = body_json(unread).await;
    assert_eq!(json["data"]["unread_count"], 1);

    let feed = app
        .clone()
        .oneshot(get("/api/students/notifications", &token))
        .await
        .unwrap();
    let json = body_json(feed).await;
    let id = json["data"][0]["id"].as_i64().unwrap();
    assert_eq!(json["data"][0]["kind"], "task_assigned");
    assert_eq!(json["data"][0]["is_read"], false);

    let mark = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/students/notifications/{}/read", id))
                .method("PATCH")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(mark.status(), StatusCode::OK);

    let unread = app
        .clone()
        .oneshot(get("/api/students/notifications/unread-count", &token))
        .await
        .unwrap();
    let json = body_json(unread).await;
    assert_eq!(json["data"]["unread_count"], 0);
}
