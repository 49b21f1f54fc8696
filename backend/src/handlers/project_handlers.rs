use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use diesel::Connection;
use serde_json::Value;

use crate::{
    auth::MaybeUser,
    error::{AppError, AppResult},
    extract::{AppJson, AppPath},
    handlers::params::{self, ProjectParams},
    models::{
        project_models::{Project, ProjectWithTodos},
        todo_models::Todo,
    },
    repositories::ProjectRepository,
    AppState,
};

pub async fn list_projects(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Project>>> {
    let conn = &mut state.pool.get()?;
    Ok(Json(ProjectRepository::all(conn)?))
}

pub async fn show_project(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ProjectWithTodos>> {
    let conn = &mut state.pool.get()?;
    Ok(Json(ProjectRepository::find_with_todos(conn, id)?))
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    AppJson(body): AppJson<Value>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let (new_project, todo_ids) =
        ProjectParams::permit(&body)?.into_new_project(user.map(|user| user.id));

    let conn = &mut state.pool.get()?;
    let project = ProjectRepository::create(conn, new_project, todo_ids.as_deref())?;

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update_project(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Project>> {
    let params = ProjectParams::permit(&body)?;

    let conn = &mut state.pool.get()?;
    let project = conn.transaction::<_, AppError, _>(|conn| {
        let project = ProjectRepository::find(conn, id)?;
        let changes = params.changes_for(&project);
        ProjectRepository::update(conn, &project, changes, params.todo_ids.as_deref())
    })?;

    Ok(Json(project))
}

pub async fn destroy_project(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    let conn = &mut state.pool.get()?;
    ProjectRepository::destroy(conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_todo(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Todo>> {
    let todo_id = params::todo_id(&body)?;
    let conn = &mut state.pool.get()?;
    Ok(Json(ProjectRepository::add_todo(conn, id, todo_id)?))
}

pub async fn remove_todo(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i32>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Todo>> {
    let todo_id = params::todo_id(&body)?;
    let conn = &mut state.pool.get()?;
    Ok(Json(ProjectRepository::remove_todo(conn, id, todo_id)?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::{config::Config, test_support::TestClient};

    async fn create(client: &mut TestClient, path: &str, body: Value) -> i64 {
        let (status, created) = client.send(Method::POST, path, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        created["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn project_crud() {
        let mut client = TestClient::new(Config::default());

        let id = create(
            &mut client,
            "/projects",
            json!({"project": {"title": "Personal Website", "description": "Portfolio"}}),
        )
        .await;

        let (status, project) = client.send(Method::GET, &format!("/projects/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(project["status"], "not_started");
        assert_eq!(project["todos"], json!([]));

        let (status, project) = client
            .send(
                Method::PATCH,
                &format!("/projects/{id}"),
                Some(json!({"project": {"status": "in_progress"}})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(project["status"], "in_progress");
        assert_eq!(project["title"], "Personal Website");

        let (status, projects) = client.send(Method::GET, "/projects", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(projects.as_array().unwrap().len(), 1);

        let (status, _) = client.send(Method::DELETE, &format!("/projects/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = client.send(Method::DELETE, &format!("/projects/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_description_is_unprocessable() {
        let mut client = TestClient::new(Config::default());
        let (status, body) = client
            .send(
                Method::POST,
                "/projects",
                Some(json!({"title": "Reading List", "description": ""})),
            )
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"], json!(["Description can't be blank"]));
        let (_, projects) = client.send(Method::GET, "/projects", None).await;
        assert_eq!(projects, json!([]));
    }

    #[tokio::test]
    async fn invalid_update_leaves_the_row_alone() {
        let mut client = TestClient::new(Config::default());
        let id = create(
            &mut client,
            "/projects",
            json!({"title": "Fitness", "description": "Workouts"}),
        )
        .await;

        let (status, _) = client
            .send(Method::PATCH, &format!("/projects/{id}"), Some(json!({"title": ""})))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, project) = client.send(Method::GET, &format!("/projects/{id}"), None).await;
        assert_eq!(project["title"], "Fitness");
    }

    #[tokio::test]
    async fn deleting_a_project_cascades_to_its_todos() {
        let mut client = TestClient::new(Config::default());
        let project = create(
            &mut client,
            "/projects",
            json!({"title": "Home Renovation", "description": "Kitchen"}),
        )
        .await;

        let mut todo_ids = Vec::new();
        for title in ["Get quotes", "Budget", "Layout"] {
            let id = create(
                &mut client,
                "/todos",
                json!({"todo": {"title": title, "description": "-", "project_id": project}}),
            )
            .await;
            todo_ids.push(id);
        }

        let (status, _) = client
            .send(Method::DELETE, &format!("/projects/{project}"), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        for id in todo_ids {
            let (status, _) = client.send(Method::GET, &format!("/todos/{id}"), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn add_and_remove_todo() {
        let mut client = TestClient::new(Config::default());
        let project = create(
            &mut client,
            "/projects",
            json!({"title": "Reading List", "description": "Books"}),
        )
        .await;
        let todo = create(
            &mut client,
            "/todos",
            json!({"title": "Atomic Habits", "description": "By month end"}),
        )
        .await;

        let (status, attached) = client
            .send(
                Method::POST,
                &format!("/projects/{project}/add_todo"),
                Some(json!({"todo_id": todo})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(attached["project_id"], project);

        let (_, shown) = client.send(Method::GET, &format!("/projects/{project}"), None).await;
        assert_eq!(shown["todos"][0]["id"], todo);

        let (status, detached) = client
            .send(
                Method::POST,
                &format!("/projects/{project}/remove_todo"),
                Some(json!({"todo_id": todo})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detached["project_id"], Value::Null);

        let (status, _) = client
            .send(
                Method::POST,
                &format!("/projects/{project}/add_todo"),
                Some(json!({"todo_id": 999})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn todo_ids_attach_on_create() {
        let mut client = TestClient::new(Config::default());
        let todo = create(
            &mut client,
            "/todos",
            json!({"title": "Design mockups", "description": "Figma"}),
        )
        .await;

        let project = create(
            &mut client,
            "/projects",
            json!({"project": {"title": "Website", "description": "Portfolio", "todo_ids": [todo]}}),
        )
        .await;

        let (_, todos) = client
            .send(Method::GET, &format!("/todos?project_id={project}"), None)
            .await;
        assert_eq!(todos[0]["id"], todo);
    }

    #[tokio::test]
    async fn projects_record_their_owner_when_signed_in() {
        let mut client = TestClient::new(Config::default());
        let (_, user) = client
            .send(
                Method::POST,
                "/users",
                Some(json!({"username": "demo", "email": "demo@example.com", "password": "password123"})),
            )
            .await;

        let id = create(
            &mut client,
            "/projects",
            json!({"title": "Owned", "description": "Mine"}),
        )
        .await;

        let (_, project) = client.send(Method::GET, &format!("/projects/{id}"), None).await;
        assert_eq!(project["user_id"], user["id"]);
    }

    #[tokio::test]
    async fn login_guard_protects_resources_when_enabled() {
        let config = Config {
            require_login: true,
            ..Config::default()
        };
        let mut client = TestClient::new(config);

        let (status, _) = client.send(Method::GET, "/projects", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        client
            .send(
                Method::POST,
                "/users",
                Some(json!({"username": "demo", "email": "demo@example.com", "password": "password123"})),
            )
            .await;
        let (status, _) = client.send(Method::GET, "/projects", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
