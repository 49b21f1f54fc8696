//! JSON API client shared by every page.
//!
//! Every request carries the browser's cookies and echoes the CSRF cookie in
//! the `X-CSRF-Token` header, so it works whether or not the server enforces
//! the CSRF policy.

use std::fmt;

use gloo_net::http::{Request, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use wasm_bindgen::JsCast;
use web_sys::{HtmlDocument, RequestCredentials};

pub const API_ROOT: &str = "http://localhost:4000";
const CSRF_COOKIE: &str = "CSRF-TOKEN";
const CSRF_HEADER: &str = "X-CSRF-Token";

pub const STATUSES: [(&str, &str); 3] = [
    ("not_started", "Not Started"),
    ("in_progress", "In Progress"),
    ("completed", "Completed"),
];

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Project {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub user_id: Option<i32>,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub todos: Vec<Todo>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub project_id: Option<i32>,
    pub created_at: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProjectInput {
    pub title: String,
    pub description: String,
    pub status: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TodoInput {
    pub title: String,
    pub description: String,
    pub status: String,
    pub project_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a response.
    Network(String),
    /// The server answered with an error status.
    Rejected { status: u16, messages: Vec<String> },
}

impl ApiError {
    pub fn messages(&self) -> Vec<String> {
        match self {
            ApiError::Network(message) => vec![message.clone()],
            ApiError::Rejected { messages, .. } => messages.clone(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Rejected { status: 401, .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(message) => write!(f, "request failed: {message}"),
            ApiError::Rejected { status, messages } => {
                write!(f, "server returned {status}: {}", messages.join(", "))
            }
        }
    }
}

/// Finds `name` in a `document.cookie` style string.
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Error payloads come as `{"errors": [...]}` (validation) or `{"error": "..."}`.
pub fn error_messages(body: &Value) -> Vec<String> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        return errors
            .iter()
            .filter_map(|e| e.as_str().map(str::to_string))
            .collect();
    }
    match body.get("error").and_then(Value::as_str) {
        Some(message) => vec![message.to_string()],
        None => Vec::new(),
    }
}

pub fn status_label(status: &str) -> &str {
    STATUSES
        .iter()
        .find(|(value, _)| *value == status)
        .map(|(_, label)| *label)
        .unwrap_or(status)
}

fn csrf_token() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let cookies = document.dyn_into::<HtmlDocument>().ok()?.cookie().ok()?;
    cookie_value(&cookies, CSRF_COOKIE)
}

fn prepare(request: Request) -> Request {
    let request = request.credentials(RequestCredentials::Include);
    match csrf_token() {
        Some(token) => request.header(CSRF_HEADER, &token),
        None => request,
    }
}

fn url(path: &str) -> String {
    format!("{API_ROOT}{path}")
}

async fn send(request: Request) -> Result<Response, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if response.ok() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    let mut messages = error_messages(&body);
    if messages.is_empty() {
        messages.push(format!("Request failed with status {status}"));
    }
    let err = ApiError::Rejected { status, messages };
    error!("{err}");
    Err(err)
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Network(format!("unreadable response: {e}")))
}

fn with_body(request: Request, body: &Value) -> Result<Request, ApiError> {
    prepare(request)
        .json(body)
        .map_err(|e| ApiError::Network(e.to_string()))
}

pub async fn get<T: DeserializeOwned>(path: &str) -> Result<T, ApiError> {
    read(send(prepare(Request::get(&url(path)))).await?).await
}

pub async fn post<T: DeserializeOwned>(path: &str, body: &Value) -> Result<T, ApiError> {
    read(send(with_body(Request::post(&url(path)), body)?).await?).await
}

pub async fn patch<T: DeserializeOwned>(path: &str, body: &Value) -> Result<T, ApiError> {
    read(send(with_body(Request::patch(&url(path)), body)?).await?).await
}

/// Deletes ignore the response body; resources answer 204.
pub async fn delete(path: &str) -> Result<(), ApiError> {
    send(prepare(Request::delete(&url(path)))).await.map(|_| ())
}

pub fn todos_in(project_id: i32, todos: &[Todo]) -> Vec<&Todo> {
    todos
        .iter()
        .filter(|todo| todo.project_id == Some(project_id))
        .collect()
}

pub fn project_title(todo: &Todo, projects: &[Project]) -> Option<String> {
    let id = todo.project_id?;
    projects
        .iter()
        .find(|project| project.id == id)
        .map(|project| project.title.clone())
}

pub fn matches_status(filter: &Option<String>, status: &str) -> bool {
    filter.as_deref().map_or(true, |wanted| wanted == status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn todo(id: i32, project_id: Option<i32>) -> Todo {
        Todo {
            id,
            title: format!("Todo {id}"),
            description: String::new(),
            status: "not_started".into(),
            project_id,
            created_at: String::new(),
        }
    }

    #[test]
    fn reads_cookies_from_the_document_string() {
        let cookies = "theme=dark; CSRF-TOKEN=abc123; other=1";
        assert_eq!(cookie_value(cookies, "CSRF-TOKEN").as_deref(), Some("abc123"));
        assert_eq!(cookie_value(cookies, "missing"), None);
        assert_eq!(cookie_value("", "CSRF-TOKEN"), None);
    }

    #[test]
    fn both_error_shapes_become_messages() {
        let validation = json!({"errors": ["Title can't be blank", "Status can't be blank"]});
        assert_eq!(error_messages(&validation).len(), 2);

        let single = json!({"error": "Invalid username or password"});
        assert_eq!(error_messages(&single), vec!["Invalid username or password"]);

        assert!(error_messages(&Value::Null).is_empty());
    }

    #[test]
    fn unknown_statuses_are_shown_verbatim() {
        assert_eq!(status_label("in_progress"), "In Progress");
        assert_eq!(status_label("blocked"), "blocked");
    }

    #[test]
    fn joins_todos_to_projects_by_id() {
        let projects = vec![Project {
            id: 7,
            title: "Reading List".into(),
            description: String::new(),
            status: "not_started".into(),
            user_id: None,
            created_at: String::new(),
        }];
        let todos = vec![todo(1, Some(7)), todo(2, None), todo(3, Some(7))];

        assert_eq!(todos_in(7, &todos).len(), 2);
        assert_eq!(project_title(&todos[0], &projects).as_deref(), Some("Reading List"));
        assert_eq!(project_title(&todos[1], &projects), None);
    }

    #[test]
    fn an_empty_filter_matches_everything() {
        assert!(matches_status(&None, "completed"));
        assert!(matches_status(&Some("completed".into()), "completed"));
        assert!(!matches_status(&Some("completed".into()), "in_progress"));
    }

    #[test]
    fn project_detail_flattens_the_project() {
        let body = json!({
            "id": 1, "title": "Website", "description": "Portfolio", "status": "in_progress",
            "user_id": null, "created_at": "2024-05-14T18:00:00", "updated_at": "2024-05-14T18:00:00",
            "todos": [{"id": 3, "title": "Mockups", "description": "Figma", "status": "completed",
                       "project_id": 1, "user_id": null,
                       "created_at": "2024-05-14T18:00:00", "updated_at": "2024-05-14T18:00:00"}]
        });
        let detail: ProjectDetail = serde_json::from_value(body).unwrap();
        assert_eq!(detail.project.title, "Website");
        assert_eq!(detail.todos[0].project_id, Some(1));
    }
}
