pub mod project_repository;
pub mod todo_repository;
pub mod user_repository;

pub use project_repository::ProjectRepository;
pub use todo_repository::TodoRepository;
pub use user_repository::UserRepository;
