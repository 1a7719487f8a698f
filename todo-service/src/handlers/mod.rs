//! HTTP handlers for todo-service.

pub mod health;
pub mod home;
pub mod todos;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use home::home;
pub use todos::{create_todo, delete_todo, list_todos, update_todo};
