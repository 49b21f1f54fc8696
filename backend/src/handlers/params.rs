//! Allow-lists for mass assignment. Each params struct copies only its
//! permitted keys out of the raw JSON body; anything else is dropped.
//!
//! Bodies may arrive wrapped in the resource key (`{"todo": {...}}`) or flat.

use serde_json::{Map, Value};

use crate::{
    error::{AppError, AppResult},
    models::{
        now,
        project_models::{NewProject, Project, ProjectChanges},
        todo_models::{NewTodo, Todo, TodoChanges},
        DEFAULT_STATUS,
    },
};

fn scope<'a>(body: &'a Value, keys: &[&str]) -> AppResult<&'a Map<String, Value>> {
    let Some(root) = body.as_object() else {
        return Err(AppError::BadRequest(format!(
            "param is missing or the value is empty: {}",
            keys[0]
        )));
    };

    for key in keys {
        if let Some(Value::Object(inner)) = root.get(*key) {
            return Ok(inner);
        }
    }
    Ok(root)
}

fn string_field(
    fields: &Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match fields.get(key)? {
        Value::String(value) => Some(value.clone()),
        Value::Null => Some(String::new()),
        _ => {
            errors.push(format!("{label} must be a string"));
            None
        }
    }
}

fn id_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(number) => number.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Absent: `None`. Present: `Some(None)` for null or empty, else the id.
fn optional_id_field(
    fields: &Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut Vec<String>,
) -> Option<Option<i32>> {
    let value = fields.get(key)?;
    match value {
        Value::Null => Some(None),
        Value::String(text) if text.trim().is_empty() => Some(None),
        _ => match id_value(value) {
            Some(id) => Some(Some(id)),
            None => {
                errors.push(format!("{label} must be a number"));
                None
            }
        },
    }
}

fn finish<T>(params: T, errors: Vec<String>) -> AppResult<T> {
    if errors.is_empty() {
        Ok(params)
    } else {
        Err(AppError::Validation(errors))
    }
}

/// title, description, status, todo_ids
#[derive(Debug, Default)]
pub struct ProjectParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub todo_ids: Option<Vec<i32>>,
}

impl ProjectParams {
    pub fn permit(body: &Value) -> AppResult<Self> {
        let fields = scope(body, &["project"])?;
        let mut errors = Vec::new();

        let todo_ids = match fields.get("todo_ids") {
            None => None,
            Some(Value::Null) => Some(Vec::new()),
            Some(Value::Array(items)) => {
                let ids: Option<Vec<i32>> = items.iter().map(id_value).collect();
                if ids.is_none() {
                    errors.push("Todo ids must be numbers".to_string());
                }
                ids
            }
            Some(_) => {
                errors.push("Todo ids must be a list".to_string());
                None
            }
        };

        let params = Self {
            title: string_field(fields, "title", "Title", &mut errors),
            description: string_field(fields, "description", "Description", &mut errors),
            status: string_field(fields, "status", "Status", &mut errors),
            todo_ids,
        };
        finish(params, errors)
    }

    pub fn into_new_project(self, user_id: Option<i32>) -> (NewProject, Option<Vec<i32>>) {
        let now = now();
        let project = NewProject {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            user_id,
            created_at: now,
            updated_at: now,
        };
        (project, self.todo_ids)
    }

    /// The stored row with the submitted fields laid over it.
    pub fn changes_for(&self, project: &Project) -> ProjectChanges {
        ProjectChanges {
            title: self.title.clone().unwrap_or_else(|| project.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| project.description.clone()),
            status: self.status.clone().unwrap_or_else(|| project.status.clone()),
            updated_at: now(),
        }
    }
}

/// title, description, status, project_id
#[derive(Debug, Default)]
pub struct TodoParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<Option<i32>>,
}

impl TodoParams {
    pub fn permit(body: &Value) -> AppResult<Self> {
        let fields = scope(body, &["todo"])?;
        let mut errors = Vec::new();

        let params = Self {
            title: string_field(fields, "title", "Title", &mut errors),
            description: string_field(fields, "description", "Description", &mut errors),
            status: string_field(fields, "status", "Status", &mut errors),
            project_id: optional_id_field(fields, "project_id", "Project", &mut errors),
        };
        finish(params, errors)
    }

    pub fn into_new_todo(self, user_id: Option<i32>) -> NewTodo {
        let now = now();
        NewTodo {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            project_id: self.project_id.flatten(),
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn changes_for(&self, todo: &Todo) -> TodoChanges {
        TodoChanges {
            title: self.title.clone().unwrap_or_else(|| todo.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| todo.description.clone()),
            status: self.status.clone().unwrap_or_else(|| todo.status.clone()),
            project_id: self.project_id.unwrap_or(todo.project_id),
            updated_at: now(),
        }
    }
}

/// username, email, password
#[derive(Debug, Default)]
pub struct UserParams {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserParams {
    pub fn permit(body: &Value) -> AppResult<Self> {
        let fields = scope(body, &["user"])?;
        let mut errors = Vec::new();

        let params = Self {
            username: string_field(fields, "username", "Username", &mut errors),
            email: string_field(fields, "email", "Email", &mut errors),
            password: string_field(fields, "password", "Password", &mut errors),
        };
        finish(params, errors)
    }
}

/// Login form: username and password, flat or under `session`/`user`.
#[derive(Debug)]
pub struct CredentialParams {
    pub username: String,
    pub password: String,
}

impl CredentialParams {
    pub fn permit(body: &Value) -> AppResult<Self> {
        let fields = scope(body, &["session", "user"])?;
        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Ok(Self {
            username: text("username"),
            password: text("password"),
        })
    }
}

/// `{"todo_id": N}` for the add/remove todo actions.
pub fn todo_id(body: &Value) -> AppResult<i32> {
    let fields = scope(body, &["project"])?;
    fields
        .get("todo_id")
        .and_then(id_value)
        .ok_or_else(|| AppError::BadRequest("param is missing or the value is empty: todo_id".into()))
}
