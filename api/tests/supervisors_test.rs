mod helpers;

use api::auth::{Role, generate_jwt};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use db::lifecycle;
use db::models::{
    student::{self, Model as Student},
    supervisor::{self, Model as Supervisor},
    task::{Model as Task, TaskStatus},
    task_status_update,
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

fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .uri(uri)
        .method(method)
        .header("authorization", format!("Bearer {}", token));
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
#[serial]
async fn assigning_without_students_is_not_found() {
    let (app, db) = make_test_app().await;
    let sup = Supervisor::create(&db, "jan.botha@uni.ac.za", "Jan", "Botha")
        .await
        .unwrap();
    let (token, _) = generate_jwt(sup.id, Role::Supervisor);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/supervisors/assign-task",
            &token,
            Some(json!({
                "task_name": "Proposal",
                "description": "Draft the proposal",
                "due_date": "2026-09-30"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "No students found for this supervisor");
}

#[tokio::test]
#[serial]
async fn assigning_creates_one_pending_task_per_student() {
    let (app, db) = make_test_app().await;
    let (sup, _) = seed_pair(&db).await;
    Student::create(
        &db,
        "u20000002",
        "Lerato",
        "Dlamini",
        "lerato.dlamini@uni.ac.za",
        Some(sup.id),
    )
    .await
    .unwrap();
    let (token, _) = generate_jwt(sup.id, Role::Supervisor);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/supervisors/assign-task",
            &token,
            Some(json!({
                "task_name": "Proposal",
                "description": "Draft the proposal",
                "due_date": "2026-09-30"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Task assigned to all students successfully");
    let tasks = json["data"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    for task in tasks {
        assert_eq!(task["status"], "Pending");
        assert_eq!(task["title"], "Proposal");
    }
}

#[tokio::test]
#[serial]
async fn approving_a_review_completes_the_task() {
    let (app, db) = make_test_app().await;
    let (sup, stu) = seed_pair(&db).await;
    let task = lifecycle::task::assign_task_to_students(
        &db,
        sup.id,
        "Literature review",
        "Survey the field",
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap()
    .remove(0);
    lifecycle::task::submit_task(&db, stu.id, task.id, "https://example.com", "draft")
        .await
        .unwrap();
    let (token, _) = generate_jwt(sup.id, Role::Supervisor);

    let uri = format!(
        "/api/supervisors/students/{}/tasks/{}/review",
        stu.id, task.id
    );
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            &token,
            Some(json!({ "status": "approved", "feedback": "Well structured" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "Completed");

    let history = task_status_update::Model::get_by_task(&db, task.id)
        .await
        .unwrap();
    assert_eq!(history.last().unwrap().status, TaskStatus::Completed);

    // A second decision on the same submission finds nothing to review.
    let replay = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            &token,
            Some(json!({ "status": "rejected", "feedback": "Changed my mind" })),
        ))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn rejecting_a_review_reopens_the_task() {
    let (app, db) = make_test_app().await;
    let (sup, stu) = seed_pair(&db).await;
    let task = lifecycle::task::assign_task_to_students(
        &db,
        sup.id,
        "Literature review",
        "Survey the field",
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap()
    .remove(0);
    lifecycle::task::submit_task(&db, stu.id, task.id, "https://example.com", "draft")
        .await
        .unwrap();
    let (token, _) = generate_jwt(sup.id, Role::Supervisor);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!(
                "/api/supervisors/students/{}/tasks/{}/review",
                stu.id, task.id
            ),
            &token,
            Some(json!({ "status": "rejected", "feedback": "Missing the evaluation chapter" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "Pending");
}

#[tokio::test]
#[serial]
async fn direct_task_edit_overrides_status() {
    let (app, db) = make_test_app().await;
    let (sup, _) = seed_pair(&db).await;
    let task = lifecycle::task::assign_task_to_students(
        &db,
        sup.id,
        "Literature review",
        "Survey the field",
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap()
    .remove(0);
    let (token, _) = generate_jwt(sup.id, Role::Supervisor);

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/supervisors/tasks/{}", task.id),
            &token,
            Some(json!({ "task_name": "Revised title", "status": "Completed" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Revised title");
    assert_eq!(json["data"]["status"], "Completed");

    let history = task_status_update::Model::get_by_task(&db, task.id)
        .await
        .unwrap();
    assert_eq!(history.last().unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
#[serial]
async fn editing_with_an_unknown_status_string_is_rejected() {
    let (app, db) = make_test_app().await;
    let (sup, _) = seed_pair(&db).await;
    let task = lifecycle::task::assign_task_to_students(
        &db,
        sup.id,
        "Literature review",
        "Survey the field",
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap()
    .remove(0);
    let (token, _) = generate_jwt(sup.id, Role::Supervisor);

    // "Done" is outside the closed status set, so deserialization fails.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/supervisors/tasks/{}", task.id),
            &token,
            Some(json!({ "status": "Done" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let unchanged = Task::get_by_id(&db, task.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, TaskStatus::Pending);
}

#[tokio::test]
#[serial]
async fn schedules_round_trip_through_both_time_formats() {
    let (app, db) = make_test_app().await;
    let (sup, stu) = seed_pair(&db).await;
    let (token, _) = generate_jwt(sup.id, Role::Supervisor);

    let create = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/supervisors/schedules",
            &token,
            Some(json!({
                "title": "Project Review Meeting",
                "start_date": "2026-09-15",
                "start_time": "09:00",
                "start_period": "AM",
                "end_date": "2026-09-15",
                "end_time": "01:30",
                "end_period": "PM",
                "description": "Monthly review",
                "color": "#3b82f6"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::CREATED);
    let json = body_json(create).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["start_time"], "09:00");
    assert_eq!(json["data"]["end_time"], "13:30");
    assert_eq!(json["data"]["end_time_12"]["display"], "01:30 PM");

    // The supervisor's students see the same schedule read-only.
    let (student_token, _) = generate_jwt(stu.id, Role::Student);
    let feed = app
        .clone()
        .oneshot(request("GET", "/api/students/schedules", &student_token, None))
        .await
        .unwrap();
    assert_eq!(feed.status(), StatusCode::OK);
    let json = body_json(feed).await;
    assert_eq!(json["data"][0]["id"], id);

    let update = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/supervisors/schedules/{}", id),
            &token,
            Some(json!({ "end_time": "03:00", "end_period": "PM" })),
        ))
        .await
        .unwrap();
    assert_eq!(update.status(), StatusCode::OK);
    let json = body_json(update).await;
    assert_eq!(json["data"]["end_time"], "15:00");

    let delete = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/supervisors/schedules/{}", id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(delete.status(), StatusCode::OK);

    let gone = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/supervisors/schedules/{}", id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn schedule_must_start_before_it_ends() {
    let (app, db) = make_test_app().await;
    let (sup, _) = seed_pair(&db).await;
    let (token, _) = generate_jwt(sup.id, Role::Supervisor);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/supervisors/schedules",
            &token,
            Some(json!({
                "title": "Backwards meeting",
                "start_date": "2026-09-15",
                "start_time": "02:00",
                "start_period": "PM",
                "end_date": "2026-09-15",
                "end_time": "09:00",
                "end_period": "AM"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Start time must be before end time");
}

#[tokio::test]
#[serial]
async fn schedule_times_require_a_period() {
    let (app, db) = make_test_app().await;
    let (sup, _) = seed_pair(&db).await;
    let (token, _) = generate_jwt(sup.id, Role::Supervisor);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/supervisors/schedules",
            &token,
            Some(json!({
                "title": "Meeting",
                "start_date": "2026-09-15",
                "start_time": "09:00",
                "end_date": "2026-09-15",
                "end_time": "11:00",
                "end_period": "AM"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Start time requires a period (AM or PM)");
}

#[tokio::test]
#[serial]
async fn dashboard_covers_tasks_and_projects() {
    let (app, db) = make_test_app().await;
    let (sup, stu) = seed_pair(&db).await;
    let task = lifecycle::task::assign_task_to_students(
        &db,
        sup.id,
        "Literature review",
        "Survey the field",
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap()
    .remove(0);
    lifecycle::task::submit_task(&db, stu.id, task.id, "https://example.com", "draft")
        .await
        .unwrap();
    let (token, _) = generate_jwt(sup.id, Role::Supervisor);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/supervisors/dashboard-stats", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["tasks_status"]["under_review"], 1);
    assert_eq!(json["data"]["projects_status"]["in_progress"], 1);
    assert_eq!(json["data"]["tasks_metrics"].as_array().unwrap().len(), 6);
    assert_eq!(json["data"]["projects_metrics"].as_array().unwrap().len(), 6);
    // The history this month: Pending on assignment, Under Review on submit.
    assert_eq!(json["data"]["tasks_metrics"][5]["counts"]["pending"], 1);
    assert_eq!(json["data"]["tasks_metrics"][5]["counts"]["under_review"], 1);
    assert_eq!(json["data"]["task_summary"][0]["id"], task.id);
}

#[tokio::test]
#[serial]
async fn supervisors_only_see_their_own_students() {
    let (app, db) = make_test_app().await;
    let (_, stu) = seed_pair(&db).await;
    let other = Supervisor::create(&db, "jan.botha@uni.ac.za", "Jan", "Botha")
        .await
        .unwrap();
    let (token, _) = generate_jwt(other.id, Role::Supervisor);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/supervisors/students/{}", stu.id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
