use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::api::{self, status_label, Project, ProjectInput, TodoInput, User, STATUSES};
use crate::Route;

/// The signed-in user, shared from `App` down to every page.
pub type Session = UseStateHandle<Option<User>>;

#[function_component]
pub fn NavBar() -> Html {
    let session = use_context::<Session>();
    let navigator = use_navigator();

    let current = session.as_ref().and_then(|s| (**s).clone());

    let onlogout = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| {
            let session = session.clone();
            let navigator = navigator.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if api::delete("/session").await.is_ok() {
                    if let Some(session) = session {
                        session.set(None);
                    }
                    if let Some(navigator) = navigator {
                        navigator.push(&Route::Login);
                    }
                }
            });
        })
    };

    html! {
        <nav class="navbar">
            <Link<Route> to={Route::Home} classes={classes!("brand")}>{"Task Tracker"}</Link<Route>>
            <Link<Route> to={Route::Projects}>{"Projects"}</Link<Route>>
            <Link<Route> to={Route::Todos}>{"Tasks"}</Link<Route>>
            <Link<Route> to={Route::Users}>{"Users"}</Link<Route>>
            {
                match current {
                    Some(user) => html! {
                        <span class="session">
                            {format!("Signed in as {}", user.username)}
                            <button onclick={onlogout}>{"Log out"}</button>
                        </span>
                    },
                    None => html! {
                        <span class="session">
                            <Link<Route> to={Route::Login}>{"Log in"}</Link<Route>>
                            <Link<Route> to={Route::Register}>{"Sign up"}</Link<Route>>
                        </span>
                    },
                }
            }
        </nav>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusBadgeProps {
    pub status: String,
}

#[function_component]
pub fn StatusBadge(props: &StatusBadgeProps) -> Html {
    html! {
        <span class={classes!("badge", props.status.clone())}>
            {status_label(&props.status)}
        </span>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusFilterProps {
    pub value: Option<String>,
    pub onchange: Callback<Option<String>>,
}

/// "All" plus one option per status.
#[function_component]
pub fn StatusFilter(props: &StatusFilterProps) -> Html {
    let onchange = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let value = select.value();
            onchange.emit((!value.is_empty()).then_some(value));
        })
    };
    let current = props.value.clone().unwrap_or_default();

    html! {
        <label class="status-filter">
            {"Status "}
            <select {onchange}>
                <option value="" selected={current.is_empty()}>{"All"}</option>
                {
                    STATUSES.iter().map(|(value, label)| html! {
                        <option value={*value} selected={current == *value}>{*label}</option>
                    }).collect::<Html>()
                }
            </select>
        </label>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusSelectProps {
    pub value: String,
    pub onchange: Callback<String>,
}

#[function_component]
pub fn StatusSelect(props: &StatusSelectProps) -> Html {
    let onchange = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            onchange.emit(select.value());
        })
    };

    html! {
        <select {onchange}>
            {
                STATUSES.iter().map(|(value, label)| html! {
                    <option value={*value} selected={props.value == *value}>{*label}</option>
                }).collect::<Html>()
            }
        </select>
    }
}

pub const DENSITIES: [usize; 3] = [1, 3, 6];

#[derive(Properties, PartialEq)]
pub struct DisplayOptionsProps {
    pub columns: usize,
    pub onchange: Callback<usize>,
}

/// Cards per row on the projects page.
#[function_component]
pub fn DisplayOptions(props: &DisplayOptionsProps) -> Html {
    html! {
        <div class="display-options">
            {"Per row: "}
            {
                DENSITIES.iter().map(|&columns| {
                    let onchange = props.onchange.clone();
                    let active = props.columns == columns;
                    html! {
                        <button
                            class={classes!(active.then_some("active"))}
                            onclick={move |_: MouseEvent| onchange.emit(columns)}
                        >
                            {columns}
                        </button>
                    }
                }).collect::<Html>()
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ErrorListProps {
    pub errors: Vec<String>,
}

#[function_component]
pub fn ErrorList(props: &ErrorListProps) -> Html {
    if props.errors.is_empty() {
        return html! {};
    }
    html! {
        <ul class="error-message" style="color: red; margin-bottom: 10px;">
            { props.errors.iter().map(|e| html! { <li>{e}</li> }).collect::<Html>() }
        </ul>
    }
}

#[derive(Properties, PartialEq)]
pub struct ProjectFormProps {
    #[prop_or_default]
    pub initial: Option<Project>,
    pub submit_label: AttrValue,
    pub onsubmit: Callback<ProjectInput>,
}

#[function_component]
pub fn ProjectForm(props: &ProjectFormProps) -> Html {
    let input = use_state(|| match &props.initial {
        Some(project) => ProjectInput {
            title: project.title.clone(),
            description: project.description.clone(),
            status: project.status.clone(),
        },
        None => ProjectInput {
            status: STATUSES[0].0.to_string(),
            ..ProjectInput::default()
        },
    });

    let onsubmit = {
        let input = input.clone();
        let onsubmit = props.onsubmit.clone();
        let editing = props.initial.is_some();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            onsubmit.emit((*input).clone());
            if !editing {
                input.set(ProjectInput {
                    status: STATUSES[0].0.to_string(),
                    ..ProjectInput::default()
                });
            }
        })
    };

    let set_title = {
        let input = input.clone();
        move |e: Event| {
            let field: HtmlInputElement = e.target_unchecked_into();
            input.set(ProjectInput {
                title: field.value(),
                ..(*input).clone()
            });
        }
    };
    let set_description = {
        let input = input.clone();
        move |e: Event| {
            let field: HtmlTextAreaElement = e.target_unchecked_into();
            input.set(ProjectInput {
                description: field.value(),
                ..(*input).clone()
            });
        }
    };
    let set_status = {
        let input = input.clone();
        Callback::from(move |status: String| {
            input.set(ProjectInput {
                status,
                ..(*input).clone()
            });
        })
    };

    html! {
        <form class="project-form" {onsubmit}>
            <input
                type="text"
                placeholder="Title"
                value={input.title.clone()}
                onchange={set_title}
            />
            <textarea
                placeholder="Description"
                value={input.description.clone()}
                onchange={set_description}
            />
            <StatusSelect value={input.status.clone()} onchange={set_status} />
            <button type="submit">{props.submit_label.clone()}</button>
        </form>
    }
}

#[derive(Properties, PartialEq)]
pub struct TodoFormProps {
    /// Offered in the project selector; empty hides it.
    #[prop_or_default]
    pub projects: Vec<Project>,
    /// Binds every new todo to this project.
    #[prop_or_default]
    pub project_id: Option<i32>,
    pub onsubmit: Callback<TodoInput>,
}

#[function_component]
pub fn TodoForm(props: &TodoFormProps) -> Html {
    let blank = {
        let project_id = props.project_id;
        move || TodoInput {
            status: STATUSES[0].0.to_string(),
            project_id,
            ..TodoInput::default()
        }
    };
    let input = use_state(blank.clone());

    let onsubmit = {
        let input = input.clone();
        let onsubmit = props.onsubmit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            onsubmit.emit((*input).clone());
            input.set(blank());
        })
    };

    let set_title = {
        let input = input.clone();
        move |e: Event| {
            let field: HtmlInputElement = e.target_unchecked_into();
            input.set(TodoInput {
                title: field.value(),
                ..(*input).clone()
            });
        }
    };
    let set_description = {
        let input = input.clone();
        move |e: Event| {
            let field: HtmlTextAreaElement = e.target_unchecked_into();
            input.set(TodoInput {
                description: field.value(),
                ..(*input).clone()
            });
        }
    };
    let set_status = {
        let input = input.clone();
        Callback::from(move |status: String| {
            input.set(TodoInput {
                status,
                ..(*input).clone()
            });
        })
    };
    let set_project = {
        let input = input.clone();
        move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            input.set(TodoInput {
                project_id: select.value().parse().ok(),
                ..(*input).clone()
            });
        }
    };

    let project_selector = if props.projects.is_empty() || props.project_id.is_some() {
        html! {}
    } else {
        let selected = input.project_id;
        html! {
            <select onchange={set_project}>
                <option value="" selected={selected.is_none()}>{"No project"}</option>
                {
                    props.projects.iter().map(|project| html! {
                        <option
                            value={project.id.to_string()}
                            selected={selected == Some(project.id)}
                        >
                            {&project.title}
                        </option>
                    }).collect::<Html>()
                }
            </select>
        }
    };

    html! {
        <form class="todo-form" {onsubmit}>
            <input
                type="text"
                placeholder="Task title"
                value={input.title.clone()}
                onchange={set_title}
            />
            <textarea
                placeholder="Description"
                value={input.description.clone()}
                onchange={set_description}
            />
            <StatusSelect value={input.status.clone()} onchange={set_status} />
            {project_selector}
            <button type="submit">{"Add task"}</button>
        </form>
    }
}

/// `2024-05-14T18:04:58.123` -> `2024-05-14`
pub fn short_date(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}
