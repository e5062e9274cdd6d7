use std::sync::Arc;

use sqlx::Pool;

/// Shared application state. The pool is created once by the composition
/// root and handed in; repositories are constructed per request from it.
#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(pool: Pool<sqlx::Sqlite>) -> Self {
        AppState {
            state: Arc::new(AppStateInner { pool }),
        }
    }

    pub fn pool(&self) -> &Pool<sqlx::Sqlite> {
        &self.state.pool
    }
}

struct AppStateInner {
    pool: Pool<sqlx::Sqlite>,
}
