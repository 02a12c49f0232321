mod helpers;

use api::auth::{Role, generate_jwt};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use db::models::{
    admin::Model as Admin,
    project::{Model as Project, ProjectStatus},
    project_status_update,
    student::Model as Student,
    supervisor::Model as Supervisor,
};
use helpers::app::make_test_app;
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;

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
async fn admin_endpoints_require_an_admin_token() {
    let (app, db) = make_test_app().await;
    let stu = Student::create(
        &db,
        "u20000001",
        "Thabo",
        "Nkosi",
        "thabo.nkosi@uni.ac.za",
        None,
    )
    .await
    .unwrap();
    let (student_token, _) = generate_jwt(stu.id, Role::Student);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/admin/supervisors",
            &student_token,
            json!({ "email": "x@uni.ac.za", "first_name": "X", "last_name": "Y" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn creating_a_supervisor_rejects_duplicates() {
    let (app, db) = make_test_app().await;
    let admin = Admin::create(&db, "root@uni.ac.za", "Site", "Admin")
        .await
        .unwrap();
    let (token, _) = generate_jwt(admin.id, Role::Admin);

    let created = app
        .clone()
        .oneshot(post_json(
            "/api/admin/supervisors",
            &token,
            json!({
                "email": "ana.joubert@uni.ac.za",
                "first_name": "Ana",
                "last_name": "Joubert"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let json = body_json(created).await;
    assert_eq!(json["data"]["email"], "ana.joubert@uni.ac.za");

    let duplicate = app
        .clone()
        .oneshot(post_json(
            "/api/admin/supervisors",
            &token,
            json!({
                "email": "ana.joubert@uni.ac.za",
                "first_name": "Ana",
                "last_name": "Joubert"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    let json = body_json(duplicate).await;
    assert_eq!(
        json["message"],
        "A supervisor with this email already exists"
    );
}

#[tokio::test]
#[serial]
async fn creating_a_student_provisions_their_project() {
    let (app, db) = make_test_app().await;
    let admin = Admin::create(&db, "root@uni.ac.za", "Site", "Admin")
        .await
        .unwrap();
    let sup = Supervisor::create(&db, "ana.joubert@uni.ac.za", "Ana", "Joubert")
        .await
        .unwrap();
    let (token, _) = generate_jwt(admin.id, Role::Admin);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/admin/students",
            &token,
            json!({
                "matric_number": "u20000001",
                "first_name": "Thabo",
                "last_name": "Nkosi",
                "email": "thabo.nkosi@uni.ac.za",
                "supervisor_id": sup.id,
                "project_title": "Smart irrigation controller",
                "project_description": "Low-power controller for drip irrigation"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["matric_number"], "u20000001");
    assert_eq!(json["data"]["supervisor_id"], sup.id);
    assert_eq!(json["data"]["project_status"], "Not Started");

    let student_id = json["data"]["id"].as_i64().unwrap();
    let project = Project::get_by_student(&db, student_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project.status, ProjectStatus::NotStarted);
    assert_eq!(project.progress, 0);

    // Provisioning opens the project history at Not Started.
    let history = project_status_update::Model::get_by_project(&db, project.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, ProjectStatus::NotStarted);
    assert_eq!(history[0].updated_by, "admin");
}

#[tokio::test]
#[serial]
async fn creating_a_student_under_an_unknown_supervisor_is_not_found() {
    let (app, db) = make_test_app().await;
    let admin = Admin::create(&db, "root@uni.ac.za", "Site", "Admin")
        .await
        .unwrap();
    let (token, _) = generate_jwt(admin.id, Role::Admin);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/admin/students",
            &token,
            json!({
                "matric_number": "u20000001",
                "first_name": "Thabo",
                "last_name": "Nkosi",
                "email": "thabo.nkosi@uni.ac.za",
                "supervisor_id": 999,
                "project_title": "Smart irrigation controller",
                "project_description": "Low-power controller for drip irrigation"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Supervisor not found");
}

#[tokio::test]
#[serial]
async fn creating_a_student_rejects_duplicate_matric_numbers() {
    let (app, db) = make_test_app().await;
    let admin = Admin::create(&db, "root@uni.ac.za", "Site", "Admin")
        .await
        .unwrap();
    let sup = Supervisor::create(&db, "ana.joubert@uni.ac.za", "Ana", "Joubert")
        .await
        .unwrap();
    Student::create(
        &db,
        "u20000001",
        "Thabo",
        "Nkosi",
        "thabo.nkosi@uni.ac.za",
        Some(sup.id),
    )
    .await
    .unwrap();
    let (token, _) = generate_jwt(admin.id, Role::Admin);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/admin/students",
            &token,
            json!({
                "matric_number": "u20000001",
                "first_name": "Other",
                "last_name": "Person",
                "email": "other.person@uni.ac.za",
                "supervisor_id": sup.id,
                "project_title": "Duplicate",
                "project_description": "Should never exist"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "A student with this matric number already exists"
    );
}
