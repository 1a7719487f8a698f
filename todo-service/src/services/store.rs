use crate::models::{TodoFilter, TodoModel, TodoPatch};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

/// Persistence seam for todo items.
///
/// Every call is a single best-effort round trip: no transactions, no retries.
/// `update_one` and `delete_one` fail with `AppError::NotFound` when the filter
/// matches nothing; any store-side failure is `AppError::DatabaseError`.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    async fn insert(&self, todo: TodoModel) -> Result<ObjectId, AppError>;

    /// All items in the store's natural order.
    async fn find_all(&self) -> Result<Vec<TodoModel>, AppError> {
        self.find_many(&TodoFilter::default()).await
    }

    async fn find_many(&self, filter: &TodoFilter) -> Result<Vec<TodoModel>, AppError>;

    async fn find_one(&self, filter: &TodoFilter) -> Result<Option<TodoModel>, AppError>;

    async fn update_one(&self, filter: &TodoFilter, patch: &TodoPatch) -> Result<(), AppError>;

    async fn delete_one(&self, filter: &TodoFilter) -> Result<(), AppError>;
}

pub(crate) fn todo_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Todo not found"))
}
