use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use super::{project_models::Project, validate_fields};
use crate::schema::todos;

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize,
)]
#[diesel(belongs_to(Project))]
#[diesel(table_name = todos)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub project_id: Option<i32>,
    pub user_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = todos)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub status: String,
    pub project_id: Option<i32>,
    pub user_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewTodo {
    pub fn validate(&self) -> Vec<String> {
        validate_fields(&self.title, &self.description, &self.status)
    }
}

/// `project_id` is written as-is, so `None` detaches the todo.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = todos)]
#[diesel(treat_none_as_null = true)]
pub struct TodoChanges {
    pub title: String,
    pub description: String,
    pub status: String,
    pub project_id: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl TodoChanges {
    pub fn validate(&self) -> Vec<String> {
        validate_fields(&self.title, &self.description, &self.status)
    }
}
