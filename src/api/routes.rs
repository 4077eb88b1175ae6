//! API route configuration.

use axum::Router;
use axum::routing::{delete, get, post, put};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::error::{ErrorResponse, Status};
use super::state::AppState;
use super::v1::{
    self, CreateListRequest, CreateTagRequest, CreateTaskRequest, HealthResponse, PromptRequest,
    ToggleTaskRequest, UpdateTaskRequest,
};
use crate::db::{Database, Prompt, Tag, Task, TaskDetail, TaskList};

/// Build routes with generic database type.
///
/// This macro reduces boilerplate when registering handlers that are generic
/// over the Database trait. It applies the turbofish operator automatically.
macro_rules! routes {
    ($D:ty => {
        $($method:ident $path:literal => $($handler:ident)::+),* $(,)?
    }) => {{
        let router = Router::new();
        $(
            let router = router.route($path, $method($($handler)::+::<$D>));
        )*
        router
    }};
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskdeck API",
        version = "0.1.0",
        description = "Personal task store: tasks, lists, tags and a prompt library",
        license(name = "GPL-2.0")
    ),
    paths(
        v1::health,
        v1::list_tasks,
        v1::inbox_tasks,
        v1::today_tasks,
        v1::upcoming_tasks,
        v1::get_task,
        v1::create_task,
        v1::update_task,
        v1::delete_task,
        v1::toggle_task,
        v1::list_lists,
        v1::get_list,
        v1::create_list,
        v1::list_tags,
        v1::get_tag,
        v1::create_tag,
        v1::list_prompts,
        v1::search_prompts,
        v1::get_prompt,
        v1::create_prompt,
        v1::update_prompt,
        v1::delete_prompt,
    ),
    components(
        schemas(
            HealthResponse,
            Status,
            ErrorResponse,
            Task,
            TaskDetail,
            TaskList,
            Tag,
            Prompt,
            CreateTaskRequest,
            UpdateTaskRequest,
            ToggleTaskRequest,
            CreateListRequest,
            CreateTagRequest,
            PromptRequest,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "tasks", description = "Task management endpoints"),
        (name = "lists", description = "Task list endpoints"),
        (name = "tags", description = "Tag endpoints"),
        (name = "prompts", description = "Prompt library endpoints")
    )
)]
pub struct ApiDoc;

/// Create the API router with OpenAPI documentation
pub fn create_router<D: Database + 'static>(state: AppState<D>) -> Router {
    let api = ApiDoc::openapi();

    // System routes (non-generic)
    let system_routes = Router::new().route("/health", get(v1::health));

    // Static task views are matched before /api/tasks/{id}
    let task_routes = routes!(D => {
        get "/api/tasks" => v1::list_tasks,
        post "/api/tasks" => v1::create_task,
        get "/api/tasks/inbox" => v1::inbox_tasks,
        get "/api/tasks/today" => v1::today_tasks,
        get "/api/tasks/upcoming" => v1::upcoming_tasks,
        get "/api/tasks/{id}" => v1::get_task,
        put "/api/tasks/{id}" => v1::update_task,
        delete "/api/tasks/{id}" => v1::delete_task,
        post "/api/tasks/{id}/toggle" => v1::toggle_task,
    });

    let list_routes = routes!(D => {
        get "/api/lists" => v1::list_lists,
        post "/api/lists" => v1::create_list,
        get "/api/lists/{id}" => v1::get_list,
    });

    let tag_routes = routes!(D => {
        get "/api/tags" => v1::list_tags,
        post "/api/tags" => v1::create_tag,
        get "/api/tags/{id}" => v1::get_tag,
    });

    let prompt_routes = routes!(D => {
        get "/api/prompts" => v1::list_prompts,
        post "/api/prompts" => v1::create_prompt,
        get "/api/prompts/search" => v1::search_prompts,
        get "/api/prompts/{id}" => v1::get_prompt,
        put "/api/prompts/{id}" => v1::update_prompt,
        delete "/api/prompts/{id}" => v1::delete_prompt,
    });

    system_routes
        .merge(task_routes)
        .merge(list_routes)
        .merge(tag_routes)
        .merge(prompt_routes)
        .merge(Scalar::with_url("/docs", api))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
