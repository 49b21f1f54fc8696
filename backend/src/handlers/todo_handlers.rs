use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use diesel::Connection;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    auth::MaybeUser,
    error::{AppError, AppResult},
    extract::{AppJson, AppPath, AppQuery},
    handlers::params::TodoParams,
    models::todo_models::Todo,
    repositories::TodoRepository,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct TodoFilter {
    pub project_id: Option<i32>,
}

pub async fn list_todos(
    State(state): State<Arc<AppState>>,
    AppQuery(filter): AppQuery<TodoFilter>,
) -> AppResult<Json<Vec<Todo>>> {
    let conn = &mut state.pool.get()?;
    Ok(Json(TodoRepository::all(conn, filter.project_id)?))
}

pub async fn show_todo(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Todo>> {
    let conn = &mut state.pool.get()?;
    Ok(Json(TodoRepository::find(conn, id)?))
}

pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    AppJson(body): AppJson<Value>,
) -> AppResult<(StatusCode, Json<Todo>)> {
    let new_todo = TodoParams::permit(&body)?.into_new_todo(user.map(|user| user.id));

    let conn = &mut state.pool.get()?;
    let todo = TodoRepository::create(conn, new_todo)?;

    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Todo>> {
    let params = TodoParams::permit(&body)?;

    let conn = &mut state.pool.get()?;
    let todo = conn.transaction::<_, AppError, _>(|conn| {
        let todo = TodoRepository::find(conn, id)?;
        TodoRepository::update(conn, &todo, params.changes_for(&todo))
    })?;

    Ok(Json(todo))
}

pub async fn destroy_todo(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    let conn = &mut state.pool.get()?;
    TodoRepository::destroy(conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}
