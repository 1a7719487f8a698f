use crate::models::{TodoFilter, TodoModel, TodoPatch};
use crate::services::store::{todo_not_found, TodoStore};
use anyhow::Context;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::IndexOptions,
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoTodoStore {
    db: Database,
    collection: Collection<TodoModel>,
}

impl MongoTodoStore {
    /// Connects, verifies the server answers a ping and selects the collection.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, collection = %collection, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::DatabaseError(anyhow::Error::new(e).context("Failed to connect to MongoDB"))
        })?;
        let db = client.database(database);
        let store = Self {
            collection: db.collection(collection),
            db,
        };

        store.health_check().await?;
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(store)
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for todo-service");

        let created_index = IndexModel::builder()
            .keys(doc! { "createdAt": 1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_idx".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_index(created_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create createdAt index: {}", e);
                AppError::from(e)
            })?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl TodoStore for MongoTodoStore {
    async fn health_check(&self) -> Result<(), AppError> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::Error::new(e).context("MongoDB is unreachable"))
            })?;
        Ok(())
    }

    async fn insert(&self, todo: TodoModel) -> Result<ObjectId, AppError> {
        let id = todo.id;
        let result = self
            .collection
            .insert_one(todo, None)
            .await
            .context("Failed to save todo")
            .map_err(AppError::DatabaseError)?;

        Ok(result.inserted_id.as_object_id().unwrap_or(id))
    }

    async fn find_many(&self, filter: &TodoFilter) -> Result<Vec<TodoModel>, AppError> {
        let cursor = self
            .collection
            .find(filter.to_document(), None)
            .await
            .context("Failed to fetch todos")
            .map_err(AppError::DatabaseError)?;

        cursor
            .try_collect()
            .await
            .context("Failed to decode todos")
            .map_err(AppError::DatabaseError)
    }

    async fn find_one(&self, filter: &TodoFilter) -> Result<Option<TodoModel>, AppError> {
        self.collection
            .find_one(filter.to_document(), None)
            .await
            .context("Failed to fetch todo")
            .map_err(AppError::DatabaseError)
    }

    async fn update_one(&self, filter: &TodoFilter, patch: &TodoPatch) -> Result<(), AppError> {
        let result = self
            .collection
            .update_one(filter.to_document(), patch.to_update_document(), None)
            .await
            .context("Failed to update todo")
            .map_err(AppError::DatabaseError)?;

        if result.matched_count == 0 {
            return Err(todo_not_found());
        }
        Ok(())
    }

    async fn delete_one(&self, filter: &TodoFilter) -> Result<(), AppError> {
        let result = self
            .collection
            .delete_one(filter.to_document(), None)
            .await
            .context("Failed to delete todo")
            .map_err(AppError::DatabaseError)?;

        if result.deleted_count == 0 {
            return Err(todo_not_found());
        }
        Ok(())
    }
}
