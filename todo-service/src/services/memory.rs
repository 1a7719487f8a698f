use crate::models::{TodoFilter, TodoModel, TodoPatch};
use crate::services::store::{todo_not_found, TodoStore};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Process-local store keeping items in insertion order.
///
/// Backs `STORE_BACKEND=memory` and the handler tests. `set_offline(true)`
/// makes every call fail the way an unreachable database would.
#[derive(Default)]
pub struct InMemoryTodoStore {
    todos: Mutex<Vec<TodoModel>>,
    offline: AtomicBool,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.todos.lock().map(|todos| todos.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<TodoModel>>, AppError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "In-memory store is offline"
            )));
        }
        self.todos.lock().map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Todo store mutex poisoned: {}", e))
        })
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn health_check(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }

    async fn insert(&self, todo: TodoModel) -> Result<ObjectId, AppError> {
        let mut todos = self.lock()?;
        if todos.iter().any(|t| t.id == todo.id) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "Failed to save todo: duplicate id {}",
                todo.id
            )));
        }
        let id = todo.id;
        todos.push(todo);
        Ok(id)
    }

    async fn find_many(&self, filter: &TodoFilter) -> Result<Vec<TodoModel>, AppError> {
        let todos = self.lock()?;
        Ok(todos.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn find_one(&self, filter: &TodoFilter) -> Result<Option<TodoModel>, AppError> {
        let todos = self.lock()?;
        Ok(todos.iter().find(|t| filter.matches(t)).cloned())
    }

    async fn update_one(&self, filter: &TodoFilter, patch: &TodoPatch) -> Result<(), AppError> {
        let mut todos = self.lock()?;
        let todo = todos
            .iter_mut()
            .find(|t| filter.matches(t))
            .ok_or_else(todo_not_found)?;
        patch.apply(todo);
        Ok(())
    }

    async fn delete_one(&self, filter: &TodoFilter) -> Result<(), AppError> {
        let mut todos = self.lock()?;
        let index = todos
            .iter()
            .position(|t| filter.matches(t))
            .ok_or_else(todo_not_found)?;
        todos.remove(index);
        Ok(())
    }
}
