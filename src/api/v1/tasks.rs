//! Task management handlers.

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::api::AppState;
use crate::api::error::{ApiResponse, ErrorResponse, HttpError, HttpResult};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::db::utils::today;
use crate::db::{
    DEFAULT_PRIORITY, Database, Id, ListFilter, NewTask, TaskDetail, TaskFilter, TaskPatch,
    TaskRepository,
};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    #[schema(example = "Ship release")]
    pub title: Option<String>,
    pub description: Option<String>,
    /// A timestamp, or a `YYYY-MM-DD` date meaning midnight.
    #[schema(value_type = Option<String>, example = "2025-06-01T17:00:00")]
    #[serde(default, deserialize_with = "crate::serde_utils::optional_datetime")]
    pub due_date: Option<NaiveDateTime>,
    pub list_id: Option<Id>,
    pub parent_id: Option<Id>,
    #[schema(example = 4, minimum = 1, maximum = 4)]
    pub priority: Option<i64>,
    /// Tag names; unknown names are skipped.
    #[schema(example = json!(["Urgent"]))]
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateTaskRequest {
    fn into_new_task(self) -> HttpResult<NewTask> {
        let title = self
            .title
            .ok_or_else(|| HttpError::bad_request("Missing required fields"))?;

        Ok(NewTask {
            title,
            description: self.description,
            due_date: self.due_date,
            list_id: self.list_id,
            parent_id: self.parent_id,
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
            tags: self.tags,
        })
    }
}

/// Partial task update. Omitted fields are left alone; `null` clears the
/// clearable ones. Unknown keys are rejected.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[schema(example = "Updated title")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::serde_utils::double_option_datetime")]
    #[schema(value_type = Option<String>)]
    pub due_date: Option<Option<NaiveDateTime>>,
    /// Move to a list, or `null` for the Inbox.
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<i64>)]
    pub list_id: Option<Option<Id>>,
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<i64>)]
    pub parent_id: Option<Option<Id>>,
    pub priority: Option<i64>,
    /// Replaces the whole tag set.
    #[schema(example = json!(["Urgent"]))]
    pub tags: Option<Vec<String>>,
    pub completed: Option<bool>,
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            list_id: req.list_id,
            parent_id: req.parent_id,
            priority: req.priority,
            tags: req.tags,
            completed: req.completed,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ToggleTaskRequest {
    /// Defaults to `true` when omitted.
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTasksQuery {
    /// List id, or `null` for Inbox tasks only
    #[param(example = "1")]
    pub list_id: Option<String>,
    /// Only tasks carrying this tag
    pub tag_id: Option<Id>,
    /// Only tasks due on this day (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2025-06-01")]
    pub due_date: Option<NaiveDate>,
    /// Only tasks due on or after this day (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2025-06-01")]
    pub due_after: Option<NaiveDate>,
}

impl ListTasksQuery {
    fn into_filter(self) -> HttpResult<TaskFilter> {
        let list = match self.list_id.as_deref() {
            None => ListFilter::Any,
            Some("null") => ListFilter::Inbox,
            Some(raw) => raw.parse().map(ListFilter::List).map_err(|_| {
                HttpError::bad_request(format!("Invalid list_id '{}'", raw))
            })?,
        };

        Ok(TaskFilter {
            list,
            tag_id: self.tag_id,
            due_date: self.due_date,
            due_after: self.due_after,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List tasks, newest first
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    params(ListTasksQuery),
    responses(
        (status = 200, description = "Matching tasks", body = ApiResponse<Vec<TaskDetail>>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_tasks<D: Database>(
    State(state): State<AppState<D>>,
    ApiQuery(query): ApiQuery<ListTasksQuery>,
) -> HttpResult<Json<ApiResponse<Vec<TaskDetail>>>> {
    let filter = query.into_filter()?;
    query_tasks(&state, &filter).await
}

/// Tasks without a list
#[utoipa::path(
    get,
    path = "/api/tasks/inbox",
    tag = "tasks",
    responses(
        (status = 200, description = "Inbox tasks", body = ApiResponse<Vec<TaskDetail>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn inbox_tasks<D: Database>(
    State(state): State<AppState<D>>,
) -> HttpResult<Json<ApiResponse<Vec<TaskDetail>>>> {
    query_tasks(&state, &TaskFilter::inbox()).await
}

/// Tasks due today (UTC)
#[utoipa::path(
    get,
    path = "/api/tasks/today",
    tag = "tasks",
    responses(
        (status = 200, description = "Tasks due today", body = ApiResponse<Vec<TaskDetail>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn today_tasks<D: Database>(
    State(state): State<AppState<D>>,
) -> HttpResult<Json<ApiResponse<Vec<TaskDetail>>>> {
    query_tasks(&state, &TaskFilter::due_on(today())).await
}

/// Tasks due today or later (UTC)
#[utoipa::path(
    get,
    path = "/api/tasks/upcoming",
    tag = "tasks",
    responses(
        (status = 200, description = "Upcoming tasks", body = ApiResponse<Vec<TaskDetail>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn upcoming_tasks<D: Database>(
    State(state): State<AppState<D>>,
) -> HttpResult<Json<ApiResponse<Vec<TaskDetail>>>> {
    query_tasks(&state, &TaskFilter::due_from(today())).await
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task found", body = ApiResponse<TaskDetail>),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_task<D: Database>(
    State(state): State<AppState<D>>,
    ApiPath(id): ApiPath<Id>,
) -> HttpResult<Json<ApiResponse<TaskDetail>>> {
    let task = state.db().tasks().get(id).await?;
    Ok(Json(ApiResponse::success(task)))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = ApiResponse<TaskDetail>),
        (status = 400, description = "Invalid task", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_task<D: Database>(
    State(state): State<AppState<D>>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> HttpResult<(StatusCode, Json<ApiResponse<TaskDetail>>)> {
    let new_task = req.into_new_task()?;
    let created = state.db().tasks().create(&new_task).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Partially update a task
///
/// Only the fields present in the body change. A `tags` array replaces the
/// whole tag set.
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = ApiResponse<TaskDetail>),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_task<D: Database>(
    State(state): State<AppState<D>>,
    ApiPath(id): ApiPath<Id>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> HttpResult<Json<ApiResponse<TaskDetail>>> {
    let updated = state.db().tasks().update(id, &req.into()).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_task<D: Database>(
    State(state): State<AppState<D>>,
    ApiPath(id): ApiPath<Id>,
) -> HttpResult<Json<ApiResponse<()>>> {
    state.db().tasks().delete(id).await?;
    Ok(Json(ApiResponse::empty()))
}

/// Mark a task done or not done
///
/// The body is optional; without one the task is marked done.
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/toggle",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task ID")),
    request_body(content = ToggleTaskRequest, description = "Optional completion flag"),
    responses(
        (status = 200, description = "Task toggled", body = ApiResponse<TaskDetail>),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, body))]
pub async fn toggle_task<D: Database>(
    State(state): State<AppState<D>>,
    ApiPath(id): ApiPath<Id>,
    body: Bytes,
) -> HttpResult<Json<ApiResponse<TaskDetail>>> {
    let req: ToggleTaskRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ToggleTaskRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| HttpError::bad_request(format!("Invalid request body: {}", e)))?
    };

    let toggled = state
        .db()
        .tasks()
        .toggle(id, req.completed.unwrap_or(true))
        .await?;
    Ok(Json(ApiResponse::success(toggled)))
}

// =============================================================================
// Helpers
// =============================================================================

async fn query_tasks<D: Database>(
    state: &AppState<D>,
    filter: &TaskFilter,
) -> HttpResult<Json<ApiResponse<Vec<TaskDetail>>>> {
    let tasks = state.db().tasks().list(filter).await?;
    Ok(Json(ApiResponse::success(tasks)))
}
