//! Prompt library handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::api::AppState;
use crate::api::error::{ApiResponse, ErrorResponse, HttpError, HttpResult};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::db::{Database, Id, Prompt, PromptInput, PromptRepository, PromptSearch};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PromptRequest {
    #[schema(example = "Summarize meeting")]
    pub prompt_name: Option<String>,
    /// A JSON array or object.
    #[schema(value_type = Object, example = json!(["gpt-4", "claude"]))]
    pub ai_selection: Option<Value>,
    pub prompt_content: Option<String>,
}

impl PromptRequest {
    fn into_input(self) -> HttpResult<PromptInput> {
        let (Some(prompt_name), Some(prompt_content)) = (self.prompt_name, self.prompt_content)
        else {
            return Err(HttpError::bad_request("Prompt name and content are required"));
        };

        Ok(PromptInput {
            prompt_name,
            ai_selection: self.ai_selection.unwrap_or(Value::Null),
            prompt_content,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchPromptsQuery {
    /// Case-sensitive substring of the prompt name
    #[param(example = "Summarize")]
    pub q: Option<String>,
    /// Substring of the encoded AI selection
    #[param(example = "claude")]
    pub ai: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/prompts",
    tag = "prompts",
    responses(
        (status = 200, description = "All prompts, newest first", body = ApiResponse<Vec<Prompt>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_prompts<D: Database>(
    State(state): State<AppState<D>>,
) -> HttpResult<Json<ApiResponse<Vec<Prompt>>>> {
    let prompts = state.db().prompts().list().await?;
    Ok(Json(ApiResponse::success(prompts)))
}

#[utoipa::path(
    get,
    path = "/api/prompts/search",
    tag = "prompts",
    params(SearchPromptsQuery),
    responses(
        (status = 200, description = "Matching prompts", body = ApiResponse<Vec<Prompt>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn search_prompts<D: Database>(
    State(state): State<AppState<D>>,
    ApiQuery(query): ApiQuery<SearchPromptsQuery>,
) -> HttpResult<Json<ApiResponse<Vec<Prompt>>>> {
    let search = PromptSearch {
        search_term: query.q,
        ai_filter: query.ai,
    };
    let prompts = state.db().prompts().search(&search).await?;
    Ok(Json(ApiResponse::success(prompts)))
}

#[utoipa::path(
    get,
    path = "/api/prompts/{id}",
    tag = "prompts",
    params(("id" = i64, Path, description = "Prompt ID")),
    responses(
        (status = 200, description = "Prompt found", body = ApiResponse<Prompt>),
        (status = 404, description = "Prompt not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_prompt<D: Database>(
    State(state): State<AppState<D>>,
    ApiPath(id): ApiPath<Id>,
) -> HttpResult<Json<ApiResponse<Prompt>>> {
    let prompt = state
        .db()
        .prompts()
        .get(id)
        .await?
        .ok_or_else(|| HttpError::not_found(format!("Prompt '{}' not found", id)))?;

    Ok(Json(ApiResponse::success(prompt)))
}

#[utoipa::path(
    post,
    path = "/api/prompts",
    tag = "prompts",
    request_body = PromptRequest,
    responses(
        (status = 201, description = "Prompt created", body = ApiResponse<Prompt>),
        (status = 400, description = "Invalid prompt", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_prompt<D: Database>(
    State(state): State<AppState<D>>,
    ApiJson(req): ApiJson<PromptRequest>,
) -> HttpResult<(StatusCode, Json<ApiResponse<Prompt>>)> {
    let created = state.db().prompts().create(&req.into_input()?).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Replace a prompt's name, AI selection and content
#[utoipa::path(
    put,
    path = "/api/prompts/{id}",
    tag = "prompts",
    params(("id" = i64, Path, description = "Prompt ID")),
    request_body = PromptRequest,
    responses(
        (status = 200, description = "Prompt updated", body = ApiResponse<Prompt>),
        (status = 400, description = "Invalid prompt", body = ErrorResponse),
        (status = 404, description = "Prompt not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_prompt<D: Database>(
    State(state): State<AppState<D>>,
    ApiPath(id): ApiPath<Id>,
    ApiJson(req): ApiJson<PromptRequest>,
) -> HttpResult<Json<ApiResponse<Prompt>>> {
    let updated = state.db().prompts().update(id, &req.into_input()?).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/prompts/{id}",
    tag = "prompts",
    params(("id" = i64, Path, description = "Prompt ID")),
    responses(
        (status = 200, description = "Prompt deleted"),
        (status = 404, description = "Prompt not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_prompt<D: Database>(
    State(state): State<AppState<D>>,
    ApiPath(id): ApiPath<Id>,
) -> HttpResult<Json<ApiResponse<()>>> {
    state.db().prompts().delete(id).await?;
    Ok(Json(ApiResponse::empty()))
}
