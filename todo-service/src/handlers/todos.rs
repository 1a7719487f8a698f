//! Todo CRUD handlers.
//!
//! Each handler is a single request/response transform over one store call.
//! Failures are returned as `AppError` and rendered at the boundary.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

use crate::dtos::{
    CreateTodoRequest, CreateTodoResponse, ListTodosQuery, MessageResponse, TodoListResponse,
    UpdateTodoRequest,
};
use crate::middleware::RequestContext;
use crate::models::{TodoFilter, TodoModel, TodoPatch};
use crate::services::record_todo_operation;
use crate::startup::AppState;
use crate::utils::{parse_object_id, QueryParams, ValidatedJson};

fn record<T>(operation: &'static str, result: &Result<T, AppError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(AppError::ValidationError(_) | AppError::BadRequest(_)) => "invalid",
        Err(AppError::NotFound(_)) => "not_found",
        Err(_) => "error",
    };
    record_todo_operation(operation, outcome);
}

#[tracing::instrument(skip_all, fields(request_id = %ctx.request_id))]
pub async fn create_todo(
    State(state): State<AppState>,
    ctx: RequestContext,
    request: Result<ValidatedJson<CreateTodoRequest>, AppError>,
) -> Result<Json<CreateTodoResponse>, AppError> {
    let result = async {
        let ValidatedJson(request) = request?;
        let todo = TodoModel::new(request.title);

        let todo_id = ctx.run("insert", state.store.insert(todo)).await?;
        tracing::info!(todo_id = %todo_id, "Todo created");

        Ok::<_, AppError>(Json(CreateTodoResponse {
            message: "Todo created successfully".to_string(),
            todo_id: todo_id.to_hex(),
        }))
    }
    .await;

    record("create", &result);
    result
}

#[tracing::instrument(skip_all, fields(request_id = %ctx.request_id))]
pub async fn list_todos(
    State(state): State<AppState>,
    ctx: RequestContext,
    query: Result<QueryParams<ListTodosQuery>, AppError>,
) -> Result<Json<TodoListResponse>, AppError> {
    let result = async {
        let QueryParams(query) = query?;
        let todos = match query.completed {
            Some(completed) => {
                let filter = TodoFilter::default().with_completed(completed);
                ctx.run("find_many", state.store.find_many(&filter)).await?
            }
            None => ctx.run("find_all", state.store.find_all()).await?,
        };
        tracing::info!(count = todos.len(), "Todos listed");

        Ok::<_, AppError>(Json(TodoListResponse::from_todos(todos)))
    }
    .await;

    record("list", &result);
    result
}

#[tracing::instrument(skip_all, fields(request_id = %ctx.request_id, todo_id = %id))]
pub async fn update_todo(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    request: Result<ValidatedJson<UpdateTodoRequest>, AppError>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = async {
        // A malformed id wins over a malformed body.
        let id = parse_object_id(&id)?;
        let ValidatedJson(request) = request?;

        let filter = TodoFilter::by_id(id);
        let patch = TodoPatch {
            title: request.title,
            completed: request.completed,
        };
        ctx.run("update_one", state.store.update_one(&filter, &patch))
            .await?;
        tracing::info!(completed = patch.completed, "Todo updated");

        Ok::<_, AppError>(Json(MessageResponse::new("Todo updated successfully")))
    }
    .await;

    record("update", &result);
    result
}

#[tracing::instrument(skip_all, fields(request_id = %ctx.request_id, todo_id = %id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = async {
        let id = parse_object_id(&id)?;

        ctx.run("delete_one", state.store.delete_one(&TodoFilter::by_id(id)))
            .await?;
        tracing::info!("Todo deleted");

        Ok::<_, AppError>(Json(MessageResponse::new("Todo deleted successfully")))
    }
    .await;

    record("delete", &result);
    result
}
