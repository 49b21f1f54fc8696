use tracing::{info, warn};
use yew::prelude::*;
use yew_router::prelude::*;

mod api;
mod components;
mod pages;

use api::User;
use components::{NavBar, Session};
use pages::{
    home::Home,
    login::Login,
    project::ProjectPage,
    projects::Projects,
    register::Register,
    todos::Todos,
    users::Users,
};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/signup")]
    Register,
    #[at("/projects")]
    Projects,
    #[at("/projects/:id")]
    Project { id: i32 },
    #[at("/todos")]
    Todos,
    #[at("/users")]
    Users,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => html! { <Home /> },
        Route::Login => html! { <Login /> },
        Route::Register => html! { <Register /> },
        Route::Projects => html! { <Projects /> },
        Route::Project { id } => {
            info!("Rendering project {id}");
            html! { <ProjectPage {id} /> }
        }
        Route::Todos => html! { <Todos /> },
        Route::Users => html! { <Users /> },
        Route::NotFound => html! { <h1>{"Page not found"}</h1> },
    }
}

#[function_component]
fn App() -> Html {
    let session: Session = use_state(|| None::<User>);

    {
        let session = session.clone();
        use_effect_with_deps(
            move |_| {
                wasm_bindgen_futures::spawn_local(async move {
                    match api::get::<User>("/session").await {
                        Ok(user) => session.set(Some(user)),
                        Err(e) if e.is_unauthorized() => info!("not signed in"),
                        Err(e) => warn!("could not load the session: {e}"),
                    }
                });
                || ()
            },
            (),
        );
    }

    html! {
        <ContextProvider<Session> context={session}>
            <BrowserRouter>
                <NavBar />
                <main>
                    <Switch<Route> render={switch} />
                </main>
            </BrowserRouter>
        </ContextProvider<Session>>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    info!("Starting task tracker");
    yew::Renderer::<App>::new().render();
}
