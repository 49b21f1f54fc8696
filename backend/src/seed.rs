//! Demo data for a fresh database.

use diesel::{Connection, SqliteConnection};
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::{now, project_models::NewProject, todo_models::NewTodo, user_models::UserDraft},
    repositories::{ProjectRepository, TodoRepository, UserRepository},
};

pub const DEMO_USERNAME: &str = "Demo";

const PROJECTS: [(&str, &str, &str); 4] = [
    (
        "Personal Website",
        "Build and deploy a personal portfolio website",
        "in_progress",
    ),
    ("Reading List", "Books to read in 2024", "not_started"),
    (
        "Fitness Goals",
        "Track workout progress and nutrition",
        "in_progress",
    ),
    (
        "Home Renovation",
        "Planning and tracking home improvement projects",
        "not_started",
    ),
];

/// (project index, title, description, status)
const TODOS: [(usize, &str, &str, &str); 11] = [
    (0, "Design mockups", "Create wireframes and design mockups in Figma", "completed"),
    (0, "Set up React environment", "Initialize React project and configure build tools", "in_progress"),
    (0, "Implement responsive design", "Ensure website works well on all devices", "not_started"),
    (1, "Read \"Atomic Habits\"", "Complete by end of month", "in_progress"),
    (1, "Start \"The Pragmatic Programmer\"", "Technical reading for skill improvement", "not_started"),
    (2, "Create workout schedule", "Plan weekly workout routine", "completed"),
    (2, "Track daily calories", "Log meals and track macros", "in_progress"),
    (2, "Research gym memberships", "Compare local gym options and prices", "not_started"),
    (3, "Get contractor quotes", "Contact contractors for kitchen remodel", "not_started"),
    (3, "Create renovation budget", "Plan expenses for home improvements", "in_progress"),
    (3, "Design kitchen layout", "Draw up plans for kitchen renovation", "not_started"),
];

/// Loads the demo user with its projects and todos. Returns `false` without
/// touching anything when the demo user already exists.
pub fn seed_demo_data(conn: &mut SqliteConnection) -> AppResult<bool> {
    if UserRepository::find_by_username(conn, DEMO_USERNAME)?.is_some() {
        info!("demo data already present, skipping seed");
        return Ok(false);
    }

    conn.transaction::<_, AppError, _>(|conn| {
        let mut draft = UserDraft::new(DEMO_USERNAME.to_string(), "demo@example.com".to_string())?;
        draft.set_password("password123")?;
        let demo = UserRepository::create(conn, draft)?;

        let mut project_ids = Vec::with_capacity(PROJECTS.len());
        for (title, description, status) in PROJECTS {
            let project = ProjectRepository::create(
                conn,
                NewProject {
                    title: title.to_string(),
                    description: description.to_string(),
                    status: status.to_string(),
                    user_id: Some(demo.id),
                    created_at: now(),
                    updated_at: now(),
                },
                None,
            )?;
            project_ids.push(project.id);
        }

        for (project, title, description, status) in TODOS {
            TodoRepository::create(
                conn,
                NewTodo {
                    title: title.to_string(),
                    description: description.to_string(),
                    status: status.to_string(),
                    project_id: Some(project_ids[project]),
                    user_id: Some(demo.id),
                    created_at: now(),
                    updated_at: now(),
                },
            )?;
        }
        Ok(())
    })?;

    info!(
        "seeded {} projects and {} todos for {DEMO_USERNAME}",
        PROJECTS.len(),
        TODOS.len()
    );
    Ok(true)
}
