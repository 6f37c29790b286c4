use crate::task::{
    InvalidStatusError, Task, TaskFilter, TaskService, TaskServiceError, TaskState, TaskStatus,
};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    id: u32,
    /// Short title of the task
    title: String,
    /// Longer free-form description of the task
    description: String,
    /// Current lifecycle status of the task
    status: TaskStatus,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            status: task.status(),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status code of the failure
    status_code: u16,
    /// Human-readable description of the failure
    message: String,
}

/// Error type for task API handlers, mapped onto HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents a status value outside the closed status set.
    #[error(transparent)]
    InvalidStatus(#[from] InvalidStatusError),
    /// Represents a path id that is not a non-negative integer.
    #[error("'{0}' is not a valid task id")]
    InvalidId(String),
    /// Represents one or more request body validation failures.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),
    /// Represents a task service failure.
    #[error(transparent)]
    Service(#[from] TaskServiceError),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            ApiError::InvalidStatus(_) | ApiError::InvalidId(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Service(TaskServiceError::TaskNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(TaskServiceError::Database(err)) => {
                tracing::error!("Database error while handling request: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            "An unexpected error occurred while processing your request. Please try again later."
                .to_string()
        } else {
            self.to_string()
        };

        (
            status_code,
            Json(ErrorResponse {
                status_code: status_code.as_u16(),
                message,
            }),
        )
            .into_response()
    }
}

/// Query parameters for filtering tasks.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskFilterQuery {
    /// Optional status to filter tasks by
    #[serde(default)]
    status: Option<String>,
    /// Optional substring matched against title and description
    #[serde(default)]
    search: Option<String>,
}

impl TaskFilterQuery {
    /// Validates the raw query parameters and normalizes them into a
    /// `TaskFilter`.
    fn validate(self) -> Result<TaskFilter, ApiError> {
        let status = match self.status {
            Some(raw) => Some(raw.parse::<TaskStatus>()?),
            None => None,
        };

        if let Some(search) = &self.search {
            if search.is_empty() {
                return Err(ApiError::Validation(vec![
                    "search should not be empty".to_string(),
                ]));
            }
        }

        Ok(TaskFilter {
            status,
            search: self.search,
        })
    }
}

/// JSON request payload for creating a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    /// Short title of the task
    #[serde(default)]
    title: String,
    /// Longer free-form description of the task
    #[serde(default)]
    description: String,
}

impl CreateTaskRequest {
    /// Checks the required fields, collecting every violation rather than
    /// stopping at the first.
    fn validate(&self) -> Result<(), ApiError> {
        let mut violations = Vec::new();
        if self.title.is_empty() {
            violations.push("title should not be empty".to_string());
        }
        if self.description.is_empty() {
            violations.push("description should not be empty".to_string());
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(violations))
        }
    }
}

/// JSON request payload for updating a task's status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskStatusRequest {
    /// New status for the task, case-insensitive
    #[serde(default)]
    status: String,
}

/// Parses a path segment into a task id. Kept explicit so that non-integer
/// ids produce the same JSON error shape as every other client error.
fn parse_task_id(raw: &str) -> Result<u32, ApiError> {
    raw.parse::<u32>()
        .map_err(|_| ApiError::InvalidId(raw.to_string()))
}

/// Handler for GET /tasks - Returns all tasks matching the optional filter.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    params(
        ("status" = Option<String>, Query, description = "Optional status to filter tasks by"),
        ("search" = Option<String>, Query, description = "Optional substring matched against title and description")
    ),
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = Vec<TaskJson>),
        (status = 400, description = "Invalid filter parameters", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(
    State(state): State<Arc<TaskState>>,
    Query(query): Query<TaskFilterQuery>,
) -> Result<Json<Vec<TaskJson>>, ApiError> {
    let filter = query.validate()?;
    let service = TaskService::new(&state.db);
    let tasks = service.get_tasks(&filter).await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for GET /tasks/{id} - Returns a single task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(
        ("id" = String, Path, description = "ID of the task to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved task", body = TaskJson),
        (status = 400, description = "Invalid task id", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<TaskJson>, ApiError> {
    let id = parse_task_id(&id)?;
    let service = TaskService::new(&state.db);
    let task = service.get_task_by_id(id).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for POST /tasks - Creates a new task in the OPEN status.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Successfully created task", body = TaskJson),
        (status = 400, description = "Invalid request body", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskJson>), ApiError> {
    payload.validate()?;
    let service = TaskService::new(&state.db);
    let task = service
        .create_task(payload.title, payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(TaskJson::from(task))))
}

/// Handler for DELETE /tasks/{id} - Deletes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(
        ("id" = String, Path, description = "ID of the task to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted task"),
        (status = 400, description = "Invalid task id", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_task_id(&id)?;
    let service = TaskService::new(&state.db);
    service.delete_task(id).await?;
    Ok(StatusCode::OK)
}

/// Handler for PATCH /tasks/{id}/status - Updates a task's status.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/tasks/{id}/status",
    params(
        ("id" = String, Path, description = "ID of the task to update")
    ),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "Successfully updated task status", body = TaskJson),
        (status = 400, description = "Invalid task id or status", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_status_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTaskStatusRequest>,
) -> Result<Json<TaskJson>, ApiError> {
    let id = parse_task_id(&id)?;
    let status = payload.status.parse::<TaskStatus>()?;
    let service = TaskService::new(&state.db);
    let task = service.update_task_status(id, status).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Creates and returns the tasks API router.
pub fn create_task_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(get_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler).delete(delete_task_handler),
        )
        .route("/tasks/{id}/status", patch(update_task_status_handler))
        .with_state(state)
}
