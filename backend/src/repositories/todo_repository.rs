use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::todo_models::{NewTodo, Todo, TodoChanges},
    schema::todos,
};

pub struct TodoRepository;

impl TodoRepository {
    /// All todos, or only those attached to `project_id`.
    pub fn all(conn: &mut SqliteConnection, project_id: Option<i32>) -> QueryResult<Vec<Todo>> {
        let mut query = todos::table
            .order(todos::id)
            .select(Todo::as_select())
            .into_boxed();

        if let Some(project_id) = project_id {
            query = query.filter(todos::project_id.eq(project_id));
        }

        query.load(conn)
    }

    pub fn find(conn: &mut SqliteConnection, id: i32) -> AppResult<Todo> {
        todos::table
            .find(id)
            .select(Todo::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| AppError::not_found("Todo", id))
    }

    pub fn create(conn: &mut SqliteConnection, new_todo: NewTodo) -> AppResult<Todo> {
        let errors = new_todo.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let todo = diesel::insert_into(todos::table)
            .values(&new_todo)
            .returning(Todo::as_returning())
            .get_result(conn)?;

        info!("created todo {} ({})", todo.title, todo.id);
        Ok(todo)
    }

    pub fn update(conn: &mut SqliteConnection, todo: &Todo, changes: TodoChanges) -> AppResult<Todo> {
        let errors = changes.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let todo = diesel::update(todo)
            .set(&changes)
            .returning(Todo::as_returning())
            .get_result(conn)?;

        info!("updated todo {}", todo.id);
        Ok(todo)
    }

    pub fn destroy(conn: &mut SqliteConnection, id: i32) -> AppResult<()> {
        let removed = diesel::delete(todos::table.find(id)).execute(conn)?;
        if removed == 0 {
            return Err(AppError::not_found("Todo", id));
        }

        info!("deleted todo {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::now,
        repositories::ProjectRepository,
        test_support::{conn, new_project, new_todo},
    };

    #[test]
    fn todos_can_exist_without_a_project() {
        let conn = &mut conn();
        let todo = TodoRepository::create(conn, new_todo("Loose end")).unwrap();

        assert_eq!(todo.project_id, None);
        assert_eq!(todo.status, "not_started");
    }

    #[test]
    fn blank_fields_are_all_reported() {
        let conn = &mut conn();
        let todo = NewTodo {
            title: " ".into(),
            status: String::new(),
            ..new_todo("ignored")
        };

        let Err(AppError::Validation(errors)) = TodoRepository::create(conn, todo) else {
            panic!("expected validation error");
        };
        assert_eq!(errors, vec!["Title can't be blank", "Status can't be blank"]);
        assert!(TodoRepository::all(conn, None).unwrap().is_empty());
    }

    #[test]
    fn unknown_project_is_rejected_by_the_foreign_key() {
        let conn = &mut conn();
        let todo = NewTodo {
            project_id: Some(99),
            ..new_todo("Orphan")
        };

        let Err(AppError::Validation(errors)) = TodoRepository::create(conn, todo) else {
            panic!("expected validation error");
        };
        assert_eq!(errors, vec!["Project must exist"]);
    }

    #[test]
    fn detaching_keeps_the_todo_but_drops_it_from_the_project_filter() {
        let conn = &mut conn();
        let project = ProjectRepository::create(conn, new_project("Reading List"), None).unwrap();
        let todo = TodoRepository::create(
            conn,
            NewTodo {
                project_id: Some(project.id),
                ..new_todo("Read Atomic Habits")
            },
        )
        .unwrap();

        let filtered = TodoRepository::all(conn, Some(project.id)).unwrap();
        assert_eq!(filtered, vec![todo.clone()]);

        let changes = TodoChanges {
            title: todo.title.clone(),
            description: todo.description.clone(),
            status: todo.status.clone(),
            project_id: None,
            updated_at: now(),
        };
        TodoRepository::update(conn, &todo, changes).unwrap();

        assert!(TodoRepository::all(conn, Some(project.id)).unwrap().is_empty());
        assert_eq!(TodoRepository::find(conn, todo.id).unwrap().project_id, None);
    }

    #[test]
    fn second_delete_is_not_found() {
        let conn = &mut conn();
        let todo = TodoRepository::create(conn, new_todo("Once")).unwrap();

        TodoRepository::destroy(conn, todo.id).unwrap();
        assert!(matches!(
            TodoRepository::destroy(conn, todo.id),
            Err(AppError::NotFound(_))
        ));
    }
}
