use std::sync::Arc;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::{require_authenticated, verify_authenticity, CSRF_HEADER},
    handlers::{
        auth_handlers::{create_session, destroy_session, show_session},
        health_checker_handler,
        project_handlers::{
            add_todo, create_project, destroy_project, list_projects, remove_todo, show_project,
            update_project,
        },
        todo_handlers::{create_todo, destroy_todo, list_todos, show_todo, update_todo},
        user_handlers::{create_user, list_users, show_user},
    },
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    let mut resources: Router<Arc<AppState>> = Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(show_project)
                .patch(update_project)
                .put(update_project)
                .delete(destroy_project),
        )
        .route("/projects/:id/add_todo", post(add_todo))
        .route("/projects/:id/remove_todo", post(remove_todo))
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(show_todo)
                .patch(update_todo)
                .put(update_todo)
                .delete(destroy_todo),
        );
    if state.config.require_login {
        resources =
            resources.route_layer(from_fn_with_state(state.clone(), require_authenticated));
    }

    let cors = CorsLayer::new()
        .allow_origin(state.config.cors_origin.clone())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_credentials(true)
        .allow_headers([CONTENT_TYPE, ACCEPT, HeaderName::from_static(CSRF_HEADER)]);

    Router::new()
        .route("/", get(health_checker_handler))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(show_user))
        .route(
            "/session",
            get(show_session)
                .post(create_session)
                .delete(destroy_session),
        )
        .merge(resources)
        .layer(from_fn_with_state(state.clone(), verify_authenticity))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
