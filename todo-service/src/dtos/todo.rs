use crate::models::TodoModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTodoRequest {
    #[validate(length(min = 1, message = "Title field is required"))]
    pub title: String,
    /// Accepted for compatibility; new todos always start incomplete.
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, message = "Title field is required"))]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListTodosQuery {
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TodoResponse {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<TodoModel> for TodoResponse {
    fn from(todo: TodoModel) -> Self {
        Self {
            id: todo.id.to_hex(),
            title: todo.title,
            completed: todo.completed,
            created_at: todo.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTodoResponse {
    pub message: String,
    pub todo_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `message` is only present when the list is empty.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Vec<TodoResponse>,
}

impl TodoListResponse {
    pub fn from_todos(todos: Vec<TodoModel>) -> Self {
        let message = todos.is_empty().then(|| "No todos in list".to_string());
        Self {
            message,
            data: todos.into_iter().map(TodoResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_renders_hex_id_and_snake_case_timestamp() {
        let todo = TodoModel::new("buy milk".to_string());
        let id = todo.id;
        let created_at = todo.created_at;

        let value = serde_json::to_value(TodoResponse::from(todo)).unwrap();

        assert_eq!(value["id"], id.to_hex());
        assert_eq!(value["title"], "buy milk");
        assert_eq!(value["completed"], false);
        let rendered: DateTime<Utc> =
            serde_json::from_value(value["created_at"].clone()).unwrap();
        assert_eq!(rendered, created_at);
    }

    #[test]
    fn create_request_ignores_missing_completed() {
        let request: CreateTodoRequest =
            serde_json::from_value(json!({ "title": "buy milk" })).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.completed, None);
    }

    #[test]
    fn empty_title_fails_validation() {
        let create: CreateTodoRequest =
            serde_json::from_value(json!({ "title": "", "completed": true })).unwrap();
        assert!(create.validate().is_err());

        let update: UpdateTodoRequest = serde_json::from_value(json!({ "title": "" })).unwrap();
        assert!(update.validate().is_err());
    }

    #[test]
    fn update_request_defaults_completed_to_false() {
        let request: UpdateTodoRequest =
            serde_json::from_value(json!({ "title": "buy juice" })).unwrap();
        assert!(!request.completed);
    }

    #[test]
    fn empty_list_carries_message() {
        let empty = serde_json::to_value(TodoListResponse::from_todos(vec![])).unwrap();
        assert_eq!(empty, json!({ "message": "No todos in list", "data": [] }));

        let listed = serde_json::to_value(TodoListResponse::from_todos(vec![TodoModel::new(
            "a".to_string(),
        )]))
        .unwrap();
        assert!(listed.get("message").is_none());
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    }
}
