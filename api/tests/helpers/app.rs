use api::routes::routes;
use axum::Router;
use sea_orm::DatabaseConnection;
use util::{config::AppConfig, state::AppState};

/// Builds the full application router on a fresh in-memory database.
///
/// Returns the router (drive it with `app.clone().oneshot(request)`), plus
/// the raw connection so tests can seed and inspect rows directly.
pub async fn make_test_app() -> (Router, DatabaseConnection) {
    AppConfig::set_test_defaults();

    let db = db::test_utils::setup_test_db().await;
    let app_state = AppState::new(db.clone());

    let app = Router::new().nest("/api", routes(app_state));

    (app, db)
}
