use std::future::Future;

use serde::de::DeserializeOwned;
use tracing::error;
use yew::prelude::*;

use crate::api::{self, ApiError};

/// Loads `path` into `target`; on failure the old value stays and the
/// messages land in `errors`.
fn fetch_into<T>(path: String, target: UseStateHandle<T>, errors: UseStateHandle<Vec<String>>)
where
    T: DeserializeOwned + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        match api::get::<T>(&path).await {
            Ok(value) => target.set(value),
            Err(e) => {
                error!("loading {path} failed: {e}");
                errors.set(e.messages());
            }
        }
    });
}

/// Runs a mutation, then bumps `reload` so the page fetches everything again.
fn mutate<F>(request: F, reload: UseStateHandle<u32>, errors: UseStateHandle<Vec<String>>)
where
    F: Future<Output = Result<(), ApiError>> + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        match request.await {
            Ok(()) => {
                errors.set(Vec::new());
                reload.set(reload.wrapping_add(1));
            }
            Err(e) => errors.set(e.messages()),
        }
    });
}

pub mod home {
    use yew::prelude::*;
    use yew_router::prelude::*;

    use super::fetch_into;
    use crate::api::{matches_status, project_title, status_label, todos_in, Project, Todo, STATUSES};
    use crate::components::{ErrorList, Session, StatusBadge, StatusFilter};
    use crate::Route;

    #[function_component]
    pub fn Home() -> Html {
        let session = use_context::<Session>();
        let projects = use_state(Vec::<Project>::new);
        let todos = use_state(Vec::<Todo>::new);
        let filter = use_state(|| None::<String>);
        let errors = use_state(Vec::<String>::new);

        {
            let projects = projects.clone();
            let todos = todos.clone();
            let errors = errors.clone();
            use_effect_with_deps(
                move |_| {
                    fetch_into("/projects".to_string(), projects, errors.clone());
                    fetch_into("/todos".to_string(), todos, errors);
                    || ()
                },
                (),
            );
        }

        let onfilter = {
            let filter = filter.clone();
            Callback::from(move |status: Option<String>| filter.set(status))
        };

        let greeting = match session.as_ref().and_then(|s| (**s).clone()) {
            Some(user) => format!("Welcome back, {}", user.username),
            None => "Welcome to Task Tracker".to_string(),
        };

        let summary = |statuses: Vec<&str>| -> Html {
            STATUSES
                .iter()
                .map(|(value, label)| {
                    let count = statuses.iter().filter(|s| *s == value).count();
                    html! { <li>{format!("{label}: {count}")}</li> }
                })
                .collect()
        };

        html! {
            <div class="home-container">
                <h1>{greeting}</h1>
                <ErrorList errors={(*errors).clone()} />
                <div class="summary">
                    <section>
                        <h2>{format!("Projects ({})", projects.len())}</h2>
                        <ul>{summary(projects.iter().map(|p| p.status.as_str()).collect())}</ul>
                    </section>
                    <section>
                        <h2>{format!("Tasks ({})", todos.len())}</h2>
                        <ul>{summary(todos.iter().map(|t| t.status.as_str()).collect())}</ul>
                    </section>
                </div>
                <StatusFilter value={(*filter).clone()} onchange={onfilter} />
                <h2>{"Projects"}</h2>
                <ul class="project-summary">
                    {
                        projects.iter().filter(|p| matches_status(&filter, &p.status)).map(|project| html! {
                            <li key={project.id}>
                                <Link<Route> to={Route::Project { id: project.id }}>{&project.title}</Link<Route>>
                                {" "}
                                <StatusBadge status={project.status.clone()} />
                                {format!(" {} tasks", todos_in(project.id, &todos).len())}
                            </li>
                        }).collect::<Html>()
                    }
                </ul>
                <h2>{"Tasks"}</h2>
                <ul class="task-summary">
                    {
                        todos.iter().filter(|t| matches_status(&filter, &t.status)).map(|todo| html! {
                            <li key={todo.id}>
                                {&todo.title}
                                {" · "}
                                {project_title(todo, &projects).unwrap_or_else(|| "No project".to_string())}
                                {" · "}
                                {status_label(&todo.status)}
                            </li>
                        }).collect::<Html>()
                    }
                </ul>
            </div>
        }
    }
}

pub mod login {
    use serde_json::json;
    use web_sys::HtmlInputElement;
    use yew::prelude::*;
    use yew_router::prelude::*;

    use crate::api::{self, User};
    use crate::components::{ErrorList, Session};
    use crate::Route;

    #[function_component]
    pub fn Login() -> Html {
        let session = use_context::<Session>();
        let navigator = use_navigator();
        let username = use_state(String::new);
        let password = use_state(String::new);
        let errors = use_state(Vec::<String>::new);

        let onsubmit = {
            let username = username.clone();
            let password = password.clone();
            let errors = errors.clone();

            Callback::from(move |e: SubmitEvent| {
                e.prevent_default();
                let body = json!({
                    "session": { "username": *username, "password": *password }
                });
                let session = session.clone();
                let navigator = navigator.clone();
                let errors = errors.clone();

                wasm_bindgen_futures::spawn_local(async move {
                    match api::post::<User>("/session", &body).await {
                        Ok(user) => {
                            if let Some(session) = session {
                                session.set(Some(user));
                            }
                            if let Some(navigator) = navigator {
                                navigator.push(&Route::Projects);
                            }
                        }
                        Err(e) => errors.set(e.messages()),
                    }
                });
            })
        };

        html! {
            <div class="login-container">
                <h1>{"Login"}</h1>
                <ErrorList errors={(*errors).clone()} />
                <form onsubmit={onsubmit}>
                    <input
                        type="text"
                        placeholder="Username"
                        onchange={let username = username.clone(); move |e: Event| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            username.set(input.value());
                        }}
                    />
                    <input
                        type="password"
                        placeholder="Password"
                        onchange={let password = password.clone(); move |e: Event| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            password.set(input.value());
                        }}
                    />
                    <button type="submit">{"Login"}</button>
                </form>
                <div class="auth-redirect">
                    {"Don't have an account? "}
                    <Link<Route> to={Route::Register}>
                        {"Sign up here"}
                    </Link<Route>>
                </div>
            </div>
        }
    }
}

pub mod register {
    use serde_json::json;
    use web_sys::HtmlInputElement;
    use yew::prelude::*;
    use yew_router::prelude::*;

    use crate::api::{self, User};
    use crate::components::{ErrorList, Session};
    use crate::Route;

    pub const MISMATCH: &str = "Password confirmation doesn't match Password";

    /// Checked before anything is sent.
    pub fn confirmation_error(password: &str, confirmation: &str) -> Option<&'static str> {
        (password != confirmation).then_some(MISMATCH)
    }

    #[function_component]
    pub fn Register() -> Html {
        let session = use_context::<Session>();
        let navigator = use_navigator();
        let username = use_state(String::new);
        let email = use_state(String::new);
        let password = use_state(String::new);
        let confirmation = use_state(String::new);
        let errors = use_state(Vec::<String>::new);
        let success = use_state(|| None::<String>);

        let onsubmit = {
            let username = username.clone();
            let email = email.clone();
            let password = password.clone();
            let confirmation = confirmation.clone();
            let errors = errors.clone();
            let success = success.clone();

            Callback::from(move |e: SubmitEvent| {
                e.prevent_default();
                if let Some(message) = confirmation_error(&password, &confirmation) {
                    errors.set(vec![message.to_string()]);
                    return;
                }

                let body = json!({
                    "user": { "username": *username, "email": *email, "password": *password }
                });
                let session = session.clone();
                let navigator = navigator.clone();
                let errors = errors.clone();
                let success = success.clone();

                wasm_bindgen_futures::spawn_local(async move {
                    match api::post::<User>("/users", &body).await {
                        Ok(user) => {
                            errors.set(Vec::new());
                            success.set(Some(format!("Welcome, {}! Redirecting...", user.username)));
                            if let Some(session) = session {
                                session.set(Some(user));
                            }
                            gloo_timers::future::TimeoutFuture::new(1_000).await;
                            if let Some(navigator) = navigator {
                                navigator.push(&Route::Projects);
                            }
                        }
                        Err(e) => errors.set(e.messages()),
                    }
                });
            })
        };

        let field = |state: &UseStateHandle<String>| {
            let state = state.clone();
            move |e: Event| {
                let input: HtmlInputElement = e.target_unchecked_into();
                state.set(input.value());
            }
        };

        html! {
            <div class="register-container">
                <h1>{"Sign up"}</h1>
                <ErrorList errors={(*errors).clone()} />
                {
                    if let Some(message) = (*success).as_ref() {
                        html! {
                            <div class="success-message" style="color: green; margin-bottom: 10px;">
                                {message}
                            </div>
                        }
                    } else {
                        html! {}
                    }
                }
                <form onsubmit={onsubmit}>
                    <input type="text" placeholder="Username" onchange={field(&username)} />
                    <input type="email" placeholder="Email" onchange={field(&email)} />
                    <input type="password" placeholder="Password" onchange={field(&password)} />
                    <input
                        type="password"
                        placeholder="Confirm password"
                        onchange={field(&confirmation)}
                    />
                    <button type="submit">{"Sign up"}</button>
                </form>
                <div class="auth-redirect">
                    {"Already have an account? "}
                    <Link<Route> to={Route::Login}>
                        {"Login here"}
                    </Link<Route>>
                </div>
            </div>
        }
    }
}

pub mod projects {
    use serde_json::{json, Value};
    use yew::prelude::*;
    use yew_router::prelude::*;

    use super::{fetch_into, mutate};
    use crate::api::{self, matches_status, todos_in, Project, ProjectInput, Todo};
    use crate::components::{
        short_date, DisplayOptions, ErrorList, ProjectForm, StatusBadge, StatusFilter,
    };
    use crate::Route;

    #[function_component]
    pub fn Projects() -> Html {
        let projects = use_state(Vec::<Project>::new);
        let todos = use_state(Vec::<Todo>::new);
        let filter = use_state(|| None::<String>);
        let columns = use_state(|| 3usize);
        let errors = use_state(Vec::<String>::new);
        let reload = use_state(|| 0u32);

        {
            let projects = projects.clone();
            let todos = todos.clone();
            let errors = errors.clone();
            use_effect_with_deps(
                move |_| {
                    fetch_into("/projects".to_string(), projects, errors.clone());
                    fetch_into("/todos".to_string(), todos, errors);
                    || ()
                },
                *reload,
            );
        }

        let oncreate = {
            let reload = reload.clone();
            let errors = errors.clone();
            Callback::from(move |input: ProjectInput| {
                let body = json!({ "project": input });
                let request = async move { api::post::<Value>("/projects", &body).await.map(|_| ()) };
                mutate(request, reload.clone(), errors.clone());
            })
        };
        let onfilter = {
            let filter = filter.clone();
            Callback::from(move |status: Option<String>| filter.set(status))
        };
        let oncolumns = {
            let columns = columns.clone();
            Callback::from(move |n: usize| columns.set(n))
        };

        let grid = format!(
            "display: grid; gap: 1rem; grid-template-columns: repeat({}, 1fr);",
            *columns
        );

        html! {
            <div class="projects-container">
                <h1>{"Projects"}</h1>
                <ErrorList errors={(*errors).clone()} />
                <div class="toolbar">
                    <StatusFilter value={(*filter).clone()} onchange={onfilter} />
                    <DisplayOptions columns={*columns} onchange={oncolumns} />
                </div>
                <div class="project-grid" style={grid}>
                    {
                        projects.iter().filter(|p| matches_status(&filter, &p.status)).map(|project| html! {
                            <div class="project-card" key={project.id}>
                                <h3>
                                    <Link<Route> to={Route::Project { id: project.id }}>
                                        {&project.title}
                                    </Link<Route>>
                                </h3>
                                <StatusBadge status={project.status.clone()} />
                                <p>{&project.description}</p>
                                <p class="meta">
                                    {format!(
                                        "{} tasks · Created {}",
                                        todos_in(project.id, &todos).len(),
                                        short_date(&project.created_at)
                                    )}
                                </p>
                            </div>
                        }).collect::<Html>()
                    }
                </div>
                <h2>{"New project"}</h2>
                <ProjectForm submit_label="Create project" onsubmit={oncreate} />
            </div>
        }
    }
}

pub mod project {
    use serde_json::{json, Value};
    use web_sys::HtmlSelectElement;
    use yew::prelude::*;
    use yew_router::prelude::*;

    use super::{fetch_into, mutate};
    use crate::api::{self, ProjectDetail, ProjectInput, Todo, TodoInput};
    use crate::components::{
        short_date, ErrorList, ProjectForm, Session, StatusBadge, TodoForm,
    };
    use crate::Route;

    #[derive(Properties, PartialEq)]
    pub struct ProjectPageProps {
        pub id: i32,
    }

    #[function_component]
    pub fn ProjectPage(props: &ProjectPageProps) -> Html {
        let id = props.id;
        let session = use_context::<Session>();
        let navigator = use_navigator();
        let detail = use_state(|| None::<ProjectDetail>);
        let all_todos = use_state(Vec::<Todo>::new);
        let editing = use_state(|| false);
        let attach = use_state(|| None::<i32>);
        let errors = use_state(Vec::<String>::new);
        let reload = use_state(|| 0u32);

        {
            let detail = detail.clone();
            let all_todos = all_todos.clone();
            let errors = errors.clone();
            use_effect_with_deps(
                move |(id, _)| {
                    fetch_into(format!("/projects/{id}"), detail, errors.clone());
                    fetch_into("/todos".to_string(), all_todos, errors);
                    || ()
                },
                (id, *reload),
            );
        }

        let Some(current) = (*detail).clone() else {
            return html! {
                <div class="project-container">
                    <ErrorList errors={(*errors).clone()} />
                    <p>{"Loading..."}</p>
                </div>
            };
        };
        let project = current.project;

        let onedit = {
            let editing = editing.clone();
            let reload = reload.clone();
            let errors = errors.clone();
            Callback::from(move |input: ProjectInput| {
                let body = json!({ "project": input });
                let request = async move {
                    api::patch::<Value>(&format!("/projects/{id}"), &body).await.map(|_| ())
                };
                editing.set(false);
                mutate(request, reload.clone(), errors.clone());
            })
        };

        let onaddtask = {
            let reload = reload.clone();
            let errors = errors.clone();
            Callback::from(move |input: TodoInput| {
                let body = json!({ "todo": TodoInput { project_id: Some(id), ..input } });
                let request = async move { api::post::<Value>("/todos", &body).await.map(|_| ()) };
                mutate(request, reload.clone(), errors.clone());
            })
        };

        let onattach = {
            let attach = attach.clone();
            let reload = reload.clone();
            let errors = errors.clone();
            Callback::from(move |e: SubmitEvent| {
                e.prevent_default();
                let Some(todo_id) = *attach else {
                    return;
                };
                let body = json!({ "todo_id": todo_id });
                let request = async move {
                    api::post::<Value>(&format!("/projects/{id}/add_todo"), &body)
                        .await
                        .map(|_| ())
                };
                attach.set(None);
                mutate(request, reload.clone(), errors.clone());
            })
        };

        let ondelete = {
            let errors = errors.clone();
            Callback::from(move |_: MouseEvent| {
                let navigator = navigator.clone();
                let errors = errors.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match api::delete(&format!("/projects/{id}")).await {
                        Ok(()) => {
                            if let Some(navigator) = navigator {
                                navigator.push(&Route::Projects);
                            }
                        }
                        Err(e) => errors.set(e.messages()),
                    }
                });
            })
        };

        let remove = |todo_id: i32| {
            let reload = reload.clone();
            let errors = errors.clone();
            Callback::from(move |_: MouseEvent| {
                let body = json!({ "todo_id": todo_id });
                let request = async move {
                    api::post::<Value>(&format!("/projects/{id}/remove_todo"), &body)
                        .await
                        .map(|_| ())
                };
                mutate(request, reload.clone(), errors.clone());
            })
        };

        let unattached: Vec<&Todo> = all_todos.iter().filter(|t| t.project_id.is_none()).collect();
        let owned = session
            .as_ref()
            .and_then(|s| (**s).as_ref().map(|user| user.id))
            .map_or(false, |user_id| project.user_id == Some(user_id));

        html! {
            <div class="project-container">
                <Link<Route> to={Route::Projects}>{"← All projects"}</Link<Route>>
                <ErrorList errors={(*errors).clone()} />
                {
                    if *editing {
                        html! {
                            <ProjectForm
                                initial={Some(project.clone())}
                                submit_label="Save"
                                onsubmit={onedit}
                            />
                        }
                    } else {
                        let editing = editing.clone();
                        html! {
                            <div class="project-header">
                                <h1>{&project.title}</h1>
                                <StatusBadge status={project.status.clone()} />
                                <p>{&project.description}</p>
                                <p class="meta">
                                    {format!("Created {}", short_date(&project.created_at))}
                                    { if owned { " · yours" } else { "" } }
                                </p>
                                <button onclick={move |_: MouseEvent| editing.set(true)}>{"Edit"}</button>
                                <button class="danger" onclick={ondelete}>{"Delete project"}</button>
                            </div>
                        }
                    }
                }
                <h2>{format!("Tasks ({})", current.todos.len())}</h2>
                <ul class="task-list">
                    {
                        current.todos.iter().map(|todo| html! {
                            <li key={todo.id}>
                                <strong>{&todo.title}</strong>
                                {" "}
                                <StatusBadge status={todo.status.clone()} />
                                <p>{&todo.description}</p>
                                <button onclick={remove(todo.id)}>{"Remove from project"}</button>
                            </li>
                        }).collect::<Html>()
                    }
                </ul>
                <h2>{"Add task"}</h2>
                <TodoForm project_id={Some(id)} onsubmit={onaddtask} />
                {
                    if unattached.is_empty() {
                        html! {}
                    } else {
                        let attach_select = attach.clone();
                        html! {
                            <form class="attach-form" onsubmit={onattach}>
                                <select onchange={move |e: Event| {
                                    let select: HtmlSelectElement = e.target_unchecked_into();
                                    attach_select.set(select.value().parse().ok());
                                }}>
                                    <option value="" selected={attach.is_none()}>{"Attach an existing task"}</option>
                                    {
                                        unattached.iter().map(|todo| html! {
                                            <option value={todo.id.to_string()} selected={*attach == Some(todo.id)}>
                                                {&todo.title}
                                            </option>
                                        }).collect::<Html>()
                                    }
                                </select>
                                <button type="submit">{"Attach"}</button>
                            </form>
                        }
                    }
                }
            </div>
        }
    }
}

pub mod todos {
    use serde_json::{json, Value};
    use yew::prelude::*;

    use super::{fetch_into, mutate};
    use crate::api::{self, matches_status, project_title, Project, Todo, TodoInput};
    use crate::components::{ErrorList, StatusFilter, StatusSelect, TodoForm};

    #[function_component]
    pub fn Todos() -> Html {
        let todos = use_state(Vec::<Todo>::new);
        let projects = use_state(Vec::<Project>::new);
        let filter = use_state(|| None::<String>);
        let errors = use_state(Vec::<String>::new);
        let reload = use_state(|| 0u32);

        {
            let todos = todos.clone();
            let projects = projects.clone();
            let errors = errors.clone();
            use_effect_with_deps(
                move |_| {
                    fetch_into("/todos".to_string(), todos, errors.clone());
                    fetch_into("/projects".to_string(), projects, errors);
                    || ()
                },
                *reload,
            );
        }

        let oncreate = {
            let reload = reload.clone();
            let errors = errors.clone();
            Callback::from(move |input: TodoInput| {
                let body = json!({ "todo": input });
                let request = async move { api::post::<Value>("/todos", &body).await.map(|_| ()) };
                mutate(request, reload.clone(), errors.clone());
            })
        };
        let onfilter = {
            let filter = filter.clone();
            Callback::from(move |status: Option<String>| filter.set(status))
        };

        let set_status = |todo_id: i32| {
            let reload = reload.clone();
            let errors = errors.clone();
            Callback::from(move |status: String| {
                let body = json!({ "todo": { "status": status } });
                let request = async move {
                    api::patch::<Value>(&format!("/todos/{todo_id}"), &body)
                        .await
                        .map(|_| ())
                };
                mutate(request, reload.clone(), errors.clone());
            })
        };
        let destroy = |todo_id: i32| {
            let reload = reload.clone();
            let errors = errors.clone();
            Callback::from(move |_: MouseEvent| {
                let request = async move { api::delete(&format!("/todos/{todo_id}")).await };
                mutate(request, reload.clone(), errors.clone());
            })
        };

        html! {
            <div class="todos-container">
                <h1>{"Tasks"}</h1>
                <ErrorList errors={(*errors).clone()} />
                <StatusFilter value={(*filter).clone()} onchange={onfilter} />
                <table>
                    <thead>
                        <tr>
                            <th>{"Task"}</th>
                            <th>{"Project"}</th>
                            <th>{"Status"}</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        {
                            todos.iter().filter(|t| matches_status(&filter, &t.status)).map(|todo| html! {
                                <tr key={todo.id}>
                                    <td>
                                        <strong>{&todo.title}</strong>
                                        <p>{&todo.description}</p>
                                    </td>
                                    <td>{project_title(todo, &projects).unwrap_or_else(|| "No project".to_string())}</td>
                                    <td><StatusSelect value={todo.status.clone()} onchange={set_status(todo.id)} /></td>
                                    <td><button class="danger" onclick={destroy(todo.id)}>{"Delete"}</button></td>
                                </tr>
                            }).collect::<Html>()
                        }
                    </tbody>
                </table>
                <h2>{"New task"}</h2>
                <TodoForm projects={(*projects).clone()} onsubmit={oncreate} />
            </div>
        }
    }
}

pub mod users {
    use yew::prelude::*;
    use yew_router::prelude::*;

    use crate::api::{self, User};
    use crate::components::{short_date, ErrorList};
    use crate::Route;

    #[function_component]
    pub fn Users() -> Html {
        let users = use_state(Vec::<User>::new);
        let errors = use_state(Vec::<String>::new);
        let signed_out = use_state(|| false);

        {
            let users = users.clone();
            let errors = errors.clone();
            let signed_out = signed_out.clone();
            use_effect_with_deps(
                move |_| {
                    wasm_bindgen_futures::spawn_local(async move {
                        match api::get::<Vec<User>>("/users").await {
                            Ok(data) => users.set(data),
                            Err(e) if e.is_unauthorized() => signed_out.set(true),
                            Err(e) => errors.set(e.messages()),
                        }
                    });
                    || ()
                },
                (),
            );
        }

        if *signed_out {
            return html! {
                <div class="users-container">
                    <h1>{"Users"}</h1>
                    <p>
                        <Link<Route> to={Route::Login}>{"Log in"}</Link<Route>>
                        {" to see who else is here."}
                    </p>
                </div>
            };
        }

        html! {
            <div class="users-container">
                <h1>{"Users"}</h1>
                <ErrorList errors={(*errors).clone()} />
                <table>
                    <thead>
                        <tr>
                            <th>{"ID"}</th>
                            <th>{"Username"}</th>
                            <th>{"Email"}</th>
                            <th>{"Joined"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        {
                            users.iter().map(|user| {
                                html! {
                                    <tr key={user.id}>
                                        <td>{user.id}</td>
                                        <td>{&user.username}</td>
                                        <td>{&user.email}</td>
                                        <td>{short_date(&user.created_at)}</td>
                                    </tr>
                                }
                            }).collect::<Html>()
                        }
                    </tbody>
                </table>
            </div>
        }
    }
}
