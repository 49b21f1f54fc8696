use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use crate::error::{AppError, AppResult};

pub mod auth_handlers;
pub mod params;
pub mod project_handlers;
pub mod todo_handlers;
pub mod user_handlers;

pub async fn health_checker_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Runs bcrypt and its surrounding queries on tokio's blocking pool.
pub async fn blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        error!("blocking task failed: {e}");
        AppError::Internal("blocking task failed")
    })?
}
