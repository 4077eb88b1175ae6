//! Task list handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::api::error::{ApiResponse, ErrorResponse, HttpError, HttpResult};
use crate::api::extract::{ApiJson, ApiPath};
use crate::db::{Database, Id, NewTaskList, TaskList, TaskListRepository};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateListRequest {
    #[schema(example = "Work")]
    pub name: Option<String>,
    #[schema(example = "#4a90e2")]
    pub color: Option<String>,
    #[schema(example = "briefcase")]
    pub icon: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/lists",
    tag = "lists",
    responses(
        (status = 200, description = "All lists, newest first", body = ApiResponse<Vec<TaskList>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_lists<D: Database>(
    State(state): State<AppState<D>>,
) -> HttpResult<Json<ApiResponse<Vec<TaskList>>>> {
    let lists = state.db().task_lists().list().await?;
    Ok(Json(ApiResponse::success(lists)))
}

#[utoipa::path(
    get,
    path = "/api/lists/{id}",
    tag = "lists",
    params(("id" = i64, Path, description = "List ID")),
    responses(
        (status = 200, description = "List found", body = ApiResponse<TaskList>),
        (status = 404, description = "List not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_list<D: Database>(
    State(state): State<AppState<D>>,
    ApiPath(id): ApiPath<Id>,
) -> HttpResult<Json<ApiResponse<TaskList>>> {
    let list = state
        .db()
        .task_lists()
        .get(id)
        .await?
        .ok_or_else(|| HttpError::not_found(format!("List '{}' not found", id)))?;

    Ok(Json(ApiResponse::success(list)))
}

#[utoipa::path(
    post,
    path = "/api/lists",
    tag = "lists",
    request_body = CreateListRequest,
    responses(
        (status = 201, description = "List created", body = ApiResponse<TaskList>),
        (status = 400, description = "Name is required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_list<D: Database>(
    State(state): State<AppState<D>>,
    ApiJson(req): ApiJson<CreateListRequest>,
) -> HttpResult<(StatusCode, Json<ApiResponse<TaskList>>)> {
    let name = req
        .name
        .ok_or_else(|| HttpError::bad_request("Name is required"))?;

    let new_list = NewTaskList {
        name,
        color: req.color,
        icon: req.icon,
    };
    let created = state.db().task_lists().create(&new_list).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
