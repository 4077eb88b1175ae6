//! Tag handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::api::error::{ApiResponse, ErrorResponse, HttpError, HttpResult};
use crate::api::extract::{ApiJson, ApiPath};
use crate::db::{Database, Id, NewTag, Tag, TagRepository};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    #[schema(example = "Urgent")]
    pub name: Option<String>,
    #[schema(example = "#e74c3c")]
    pub color: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    responses(
        (status = 200, description = "All tags ordered by name", body = ApiResponse<Vec<Tag>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_tags<D: Database>(
    State(state): State<AppState<D>>,
) -> HttpResult<Json<ApiResponse<Vec<Tag>>>> {
    let tags = state.db().tags().list().await?;
    Ok(Json(ApiResponse::success(tags)))
}

#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    tag = "tags",
    params(("id" = i64, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag found", body = ApiResponse<Tag>),
        (status = 404, description = "Tag not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_tag<D: Database>(
    State(state): State<AppState<D>>,
    ApiPath(id): ApiPath<Id>,
) -> HttpResult<Json<ApiResponse<Tag>>> {
    let tag = state
        .db()
        .tags()
        .get(id)
        .await?
        .ok_or_else(|| HttpError::not_found(format!("Tag '{}' not found", id)))?;

    Ok(Json(ApiResponse::success(tag)))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    tag = "tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = ApiResponse<Tag>),
        (status = 400, description = "Name is required", body = ErrorResponse),
        (status = 409, description = "Tag name already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_tag<D: Database>(
    State(state): State<AppState<D>>,
    ApiJson(req): ApiJson<CreateTagRequest>,
) -> HttpResult<(StatusCode, Json<ApiResponse<Tag>>)> {
    let name = req
        .name
        .ok_or_else(|| HttpError::bad_request("Name is required"))?;

    let new_tag = NewTag {
        name,
        color: req.color,
    };
    let created = state.db().tags().create(&new_tag).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
