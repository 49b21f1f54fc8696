//! Fixtures shared by the unit and HTTP tests.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        Method, Request, StatusCode,
    },
    Router,
};
use cookie::Cookie;
use diesel::{connection::SimpleConnection, Connection, SqliteConnection};
use diesel_migrations::MigrationHarness;
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    auth::{CSRF_COOKIE, CSRF_HEADER},
    config::Config,
    db::{self, MIGRATIONS},
    models::{
        now, project_models::NewProject, todo_models::NewTodo, user_models::UserDraft,
        DEFAULT_STATUS,
    },
    routes::create_router,
    AppState,
};

pub fn conn() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    conn.batch_execute("PRAGMA foreign_keys = ON;").unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();
    conn
}

pub fn demo_draft(username: &str, email: &str) -> UserDraft {
    let mut draft = UserDraft::new(username.to_string(), email.to_string()).unwrap();
    draft.set_password("password123").unwrap();
    draft
}

pub fn new_project(title: &str) -> NewProject {
    NewProject {
        title: title.to_string(),
        description: format!("About {title}"),
        status: DEFAULT_STATUS.to_string(),
        user_id: None,
        created_at: now(),
        updated_at: now(),
    }
}

pub fn new_todo(title: &str) -> NewTodo {
    NewTodo {
        title: title.to_string(),
        description: format!("Steps for {title}"),
        status: DEFAULT_STATUS.to_string(),
        project_id: None,
        user_id: None,
        created_at: now(),
        updated_at: now(),
    }
}

/// Drives the full router in-process and keeps a cookie jar between
/// requests, the way a browser would.
pub struct TestClient {
    app: Router,
    cookies: HashMap<String, String>,
    echo_csrf: bool,
}

impl TestClient {
    pub fn new(config: Config) -> Self {
        let state = Arc::new(AppState {
            pool: db::memory_pool(),
            config,
        });
        Self {
            app: create_router(state),
            cookies: HashMap::new(),
            echo_csrf: true,
        }
    }

    /// Whether requests copy the CSRF cookie into `X-CSRF-Token`.
    pub fn echo_csrf(&mut self, echo: bool) {
        self.echo_csrf = echo;
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub fn clear_cookies(&mut self) {
        self.cookies.clear();
    }

    pub async fn send(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = body.map(|json| json.to_string()).unwrap_or_default();
        self.send_raw(method, path, Some("application/json"), &body)
            .await
    }

    /// Sends `body` untouched; a non-JSON response comes back as a string.
    pub async fn send_raw(
        &mut self,
        method: Method,
        path: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        if !self.cookies.is_empty() {
            let jar = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(COOKIE, jar);
        }
        if self.echo_csrf {
            if let Some(token) = self.cookies.get(CSRF_COOKIE) {
                builder = builder.header(CSRF_HEADER, token.as_str());
            }
        }

        let response = self
            .app
            .clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();

        for header in response.headers().get_all(SET_COOKIE) {
            let cookie = Cookie::parse(header.to_str().unwrap().to_string()).unwrap();
            let expired = cookie.max_age().map_or(false, |age| age.is_zero());
            if expired {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }

        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }
}
