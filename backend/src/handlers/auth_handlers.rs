use std::sync::Arc;

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    auth::{login_cookie, logout_cookie, CurrentUser, MaybeUser},
    error::{AppError, AppResult},
    extract::AppJson,
    handlers::{blocking, params::CredentialParams},
    models::user_models::UserResponse,
    repositories::UserRepository,
    AppState,
};

pub async fn show_session(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<serde_json::Value>,
) -> AppResult<Response> {
    let credentials = CredentialParams::permit(&body)?;
    let pool = state.pool.clone();

    let user = blocking(move || {
        let conn = &mut pool.get()?;
        UserRepository::find_by_credentials(conn, &credentials.username, &credentials.password)
            .map_err(|e| {
                if matches!(e, AppError::InvalidCredentials) {
                    warn!("failed login attempt for {:?}", credentials.username);
                }
                e
            })
    })
    .await?;

    info!("{} logged in", user.username);
    let cookie = login_cookie(&user, state.config.secure_cookies)?;
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(UserResponse::from(&user)),
    )
        .into_response())
}

/// Rotates the user's token so every other session holding it dies too.
pub async fn destroy_session(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
) -> AppResult<Response> {
    if let Some(mut user) = user {
        let conn = &mut state.pool.get()?;
        UserRepository::reset_session_token(conn, &mut user)?;
        info!("{} logged out", user.username);
    }

    let cookie = logout_cookie(state.config.secure_cookies)?;
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "status": "logged_out" })),
    )
        .into_response())
}
