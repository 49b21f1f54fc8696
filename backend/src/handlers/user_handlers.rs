use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::{
    auth::{login_cookie, CurrentUser},
    error::AppResult,
    extract::{AppJson, AppPath},
    handlers::{blocking, params::UserParams},
    models::user_models::{UserDraft, UserResponse},
    repositories::UserRepository,
    AppState,
};

/// Signup. A successful signup is also a login.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Response> {
    let params = UserParams::permit(&body)?;

    let pool = state.pool.clone();
    let user = blocking(move || {
        let mut draft = UserDraft::new(
            params.username.unwrap_or_default(),
            params.email.unwrap_or_default(),
        )?;
        if let Some(password) = params.password.as_deref() {
            draft.set_password(password)?;
        }

        let conn = &mut pool.get()?;
        UserRepository::create(conn, draft)
    })
    .await?;

    let cookie = login_cookie(&user, state.config.secure_cookies)?;
    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(UserResponse::from(&user)),
    )
        .into_response())
}

pub async fn list_users(
    _: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let conn = &mut state.pool.get()?;
    let users = UserRepository::all(conn)?;

    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

pub async fn show_user(
    _: CurrentUser,
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<UserResponse>> {
    let conn = &mut state.pool.get()?;
    let user = UserRepository::find(conn, id)?;

    Ok(Json(UserResponse::from(&user)))
}
