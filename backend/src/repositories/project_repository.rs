use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::{
        now,
        project_models::{NewProject, Project, ProjectChanges, ProjectWithTodos},
        todo_models::Todo,
    },
    repositories::TodoRepository,
    schema::{projects, todos},
};

pub struct ProjectRepository;

impl ProjectRepository {
    pub fn all(conn: &mut SqliteConnection) -> QueryResult<Vec<Project>> {
        projects::table
            .order(projects::id)
            .select(Project::as_select())
            .load(conn)
    }

    pub fn find(conn: &mut SqliteConnection, id: i32) -> AppResult<Project> {
        projects::table
            .find(id)
            .select(Project::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| AppError::not_found("Project", id))
    }

    pub fn find_with_todos(conn: &mut SqliteConnection, id: i32) -> AppResult<ProjectWithTodos> {
        let project = Self::find(conn, id)?;
        let todos = Todo::belonging_to(&project)
            .order(todos::id)
            .select(Todo::as_select())
            .load(conn)?;

        Ok(ProjectWithTodos { project, todos })
    }

    /// Inserts the project and, when `todo_ids` is given, attaches exactly
    /// those todos. Nothing is written unless all of it succeeds.
    pub fn create(
        conn: &mut SqliteConnection,
        new_project: NewProject,
        todo_ids: Option<&[i32]>,
    ) -> AppResult<Project> {
        let errors = new_project.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        conn.transaction(|conn| {
            let project = diesel::insert_into(projects::table)
                .values(&new_project)
                .returning(Project::as_returning())
                .get_result(conn)?;

            if let Some(ids) = todo_ids {
                Self::replace_todos(conn, project.id, ids)?;
            }

            info!("created project {} ({})", project.title, project.id);
            Ok(project)
        })
    }

    pub fn update(
        conn: &mut SqliteConnection,
        project: &Project,
        changes: ProjectChanges,
        todo_ids: Option<&[i32]>,
    ) -> AppResult<Project> {
        let errors = changes.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        conn.transaction(|conn| {
            let project = diesel::update(project)
                .set(&changes)
                .returning(Project::as_returning())
                .get_result(conn)?;

            if let Some(ids) = todo_ids {
                Self::replace_todos(conn, project.id, ids)?;
            }

            info!("updated project {}", project.id);
            Ok(project)
        })
    }

    /// Deletes the project together with its todos as one unit. Returns how
    /// many todos went with it.
    pub fn destroy(conn: &mut SqliteConnection, id: i32) -> AppResult<usize> {
        conn.transaction(|conn| {
            let removed_todos =
                diesel::delete(todos::table.filter(todos::project_id.eq(id))).execute(conn)?;

            let removed = diesel::delete(projects::table.find(id)).execute(conn)?;
            if removed == 0 {
                return Err(AppError::not_found("Project", id));
            }

            info!("deleted project {id} and {removed_todos} todos");
            Ok(removed_todos)
        })
    }

    pub fn add_todo(conn: &mut SqliteConnection, project_id: i32, todo_id: i32) -> AppResult<Todo> {
        conn.transaction(|conn| {
            let project = Self::find(conn, project_id)?;
            let todo = TodoRepository::find(conn, todo_id)?;

            let todo = diesel::update(&todo)
                .set((
                    todos::project_id.eq(Some(project.id)),
                    todos::updated_at.eq(now()),
                ))
                .returning(Todo::as_returning())
                .get_result(conn)?;

            info!("attached todo {} to project {}", todo.id, project.id);
            Ok(todo)
        })
    }

    pub fn remove_todo(
        conn: &mut SqliteConnection,
        project_id: i32,
        todo_id: i32,
    ) -> AppResult<Todo> {
        conn.transaction(|conn| {
            let project = Self::find(conn, project_id)?;
            let todo = TodoRepository::find(conn, todo_id)?;
            if todo.project_id != Some(project.id) {
                return Err(AppError::NotFound(format!(
                    "Todo {todo_id} is not attached to Project {project_id}"
                )));
            }

            let todo = diesel::update(&todo)
                .set((
                    todos::project_id.eq(None::<i32>),
                    todos::updated_at.eq(now()),
                ))
                .returning(Todo::as_returning())
                .get_result(conn)?;

            info!("detached todo {} from project {}", todo.id, project.id);
            Ok(todo)
        })
    }

    /// Makes `ids` the project's todo set: listed todos are attached, the
    /// rest are detached but kept.
    fn replace_todos(conn: &mut SqliteConnection, project_id: i32, ids: &[i32]) -> AppResult<()> {
        let existing: Vec<i32> = todos::table
            .filter(todos::id.eq_any(ids))
            .select(todos::id)
            .load(conn)?;

        if let Some(missing) = ids.iter().find(|id| !existing.contains(*id)) {
            return Err(AppError::not_found("Todo", *missing));
        }

        let updated_at = now();
        diesel::update(
            todos::table
                .filter(todos::project_id.eq(project_id))
                .filter(todos::id.ne_all(ids)),
        )
        .set((
            todos::project_id.eq(None::<i32>),
            todos::updated_at.eq(updated_at),
        ))
        .execute(conn)?;

        diesel::update(todos::table.filter(todos::id.eq_any(ids)))
            .set((
                todos::project_id.eq(Some(project_id)),
                todos::updated_at.eq(updated_at),
            ))
            .execute(conn)?;

        Ok(())
    }
}
