//! Cookie sessions and the CSRF policy.
//!
//! A request is authenticated when its session cookie carries a token that
//! matches some user's `session_token`. The lookup happens at most once per
//! request; the result is cached in the request extensions.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue, Method, Request,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::{Cookie, SameSite};
use ring::constant_time;
use tracing::warn;

use crate::{
    error::AppError,
    models::user_models::{generate_session_token, User},
    repositories::UserRepository,
    AppState,
};

pub const SESSION_COOKIE: &str = "_task_tracker_session";
pub const CSRF_COOKIE: &str = "CSRF-TOKEN";
pub const CSRF_HEADER: &str = "x-csrf-token";

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

fn to_header(cookie: Cookie<'_>) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&cookie.to_string()).map_err(|_| AppError::Internal("malformed cookie"))
}

/// Set-Cookie binding the user's current session token: the login step.
pub fn login_cookie(user: &User, secure: bool) -> Result<HeaderValue, AppError> {
    let cookie = Cookie::build((SESSION_COOKIE, user.session_token.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .build();
    to_header(cookie)
}

/// Set-Cookie expiring the session cookie.
pub fn logout_cookie(secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .build();
    cookie.make_removal();
    to_header(cookie)
}

fn csrf_cookie(token: String, secure: bool) -> Result<HeaderValue, AppError> {
    let cookie = Cookie::build((CSRF_COOKIE, token))
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .build();
    to_header(cookie)
}

#[derive(Clone)]
struct ResolvedUser(Option<User>);

/// The user behind the session cookie, if any.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(ResolvedUser(user)) = parts.extensions.get::<ResolvedUser>() {
            return Ok(MaybeUser(user.clone()));
        }

        let user = match cookie_value(&parts.headers, SESSION_COOKIE) {
            Some(token) if !token.is_empty() => {
                let conn = &mut state.pool.get()?;
                UserRepository::find_by_session_token(conn, &token)?
            }
            _ => None,
        };

        parts.extensions.insert(ResolvedUser(user.clone()));
        Ok(MaybeUser(user))
    }
}

/// Rejects anonymous requests with 401 before the handler runs.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(CurrentUser).ok_or(AppError::Unauthorized)
    }
}

/// Route layer guarding whole groups of routes.
pub async fn require_authenticated<B>(
    _user: CurrentUser,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    next.run(request).await
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Issues the CSRF cookie on every response and, when the policy is on,
/// refuses mutating requests that don't echo it in `X-CSRF-Token`.
pub async fn verify_authenticity<B>(
    State(state): State<Arc<AppState>>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    let existing = cookie_value(request.headers(), CSRF_COOKIE).filter(|token| !token.is_empty());

    let valid = !state.config.csrf_protection
        || is_safe(request.method())
        || tokens_match(existing.as_deref(), request.headers().get(CSRF_HEADER));
    if !valid {
        warn!("rejected {} {}: CSRF token mismatch", request.method(), request.uri());
    }

    let token = match existing {
        Some(token) => Ok(token),
        None => generate_session_token(),
    };
    let header = match token.and_then(|token| csrf_cookie(token, state.config.secure_cookies)) {
        Ok(header) => header,
        Err(e) => return e.into_response(),
    };

    let mut response = if valid {
        next.run(request).await
    } else {
        AppError::Forbidden.into_response()
    };
    response.headers_mut().append(SET_COOKIE, header);
    response
}

fn tokens_match(cookie: Option<&str>, header: Option<&HeaderValue>) -> bool {
    match (cookie, header) {
        (Some(cookie), Some(header)) => {
            constant_time::verify_slices_are_equal(cookie.as_bytes(), header.as_bytes()).is_ok()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_one_cookie_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("CSRF-TOKEN=abc; _task_tracker_session=tok123"),
        );

        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE).as_deref(),
            Some("tok123")
        );
        assert_eq!(cookie_value(&headers, CSRF_COOKIE).as_deref(), Some("abc"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn session_cookie_is_http_only_and_logout_expires_it() {
        let login = login_cookie_for("tok123");
        assert!(login.contains("_task_tracker_session=tok123"));
        assert!(login.contains("HttpOnly"));
        assert!(login.contains("SameSite=Lax"));

        let logout = logout_cookie(false).unwrap();
        let logout = logout.to_str().unwrap();
        assert!(logout.contains("Max-Age=0"));
    }

    #[test]
    fn csrf_tokens_must_match_exactly() {
        let header = HeaderValue::from_static("abc123");

        assert!(tokens_match(Some("abc123"), Some(&header)));
        assert!(!tokens_match(Some("abc12"), Some(&header)));
        assert!(!tokens_match(Some("abc124"), Some(&header)));
        assert!(!tokens_match(None, Some(&header)));
        assert!(!tokens_match(Some("abc123"), None));
    }

    fn login_cookie_for(token: &str) -> String {
        let user = User {
            id: 1,
            username: "demo".into(),
            email: "demo@example.com".into(),
            password_digest: "digest".into(),
            session_token: token.into(),
            created_at: crate::models::now(),
            updated_at: crate::models::now(),
        };
        login_cookie(&user, false)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }
}
