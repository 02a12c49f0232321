use sea_orm::DatabaseConnection;

/// Shared application state passed to route handlers.
///
/// Holds the live database connection. Cloning is cheap since the
/// underlying connection pool is reference-counted.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Borrow the database connection.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Clone the database connection for moving into spawned tasks.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }
}
