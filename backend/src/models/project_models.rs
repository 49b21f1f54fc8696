use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use super::{todo_models::Todo, validate_fields};
use crate::schema::projects;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Project {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub user_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub status: String,
    pub user_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewProject {
    pub fn validate(&self) -> Vec<String> {
        validate_fields(&self.title, &self.description, &self.status)
    }
}

/// The full set of editable columns, produced by merging a partial update
/// onto the stored row.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = projects)]
pub struct ProjectChanges {
    pub title: String,
    pub description: String,
    pub status: String,
    pub updated_at: NaiveDateTime,
}

impl ProjectChanges {
    pub fn validate(&self) -> Vec<String> {
        validate_fields(&self.title, &self.description, &self.status)
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectWithTodos {
    #[serde(flatten)]
    pub project: Project,
    pub todos: Vec<Todo>,
}
