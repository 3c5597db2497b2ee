use axum::{extract::State, http::StatusCode, Json};
use tracing::debug;

use super::extractors::{ItemSubmission, ListPath};
use crate::error::{ErrorResponse, Result};
use crate::models::{ItemResponse, ListCreatedResponse, NewItem};
use crate::AppState;

/// Create an empty list
#[utoipa::path(
    post,
    path = "/api/lists/",
    tag = "lists",
    responses(
        (status = 201, description = "List created", body = ListCreatedResponse)
    )
)]
pub async fn create_list(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ListCreatedResponse>)> {
    let list = state.list_service.create_list().await?;
    Ok((StatusCode::CREATED, Json(ListCreatedResponse { id: list.id })))
}

/// Items of a list, oldest first
#[utoipa::path(
    get,
    path = "/api/lists/{list_id}/",
    tag = "lists",
    params(
        ("list_id" = i64, Path, description = "List identifier")
    ),
    responses(
        (status = 200, description = "Items in the list", body = [ItemResponse]),
        (status = 404, description = "List not found", body = ErrorResponse)
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    ListPath(list_id): ListPath,
) -> Result<Json<Vec<ItemResponse>>> {
    let items = state.list_service.get_items(list_id).await?;
    debug!(list_id = %list_id, count = items.len(), "Returning list items");
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// Add an item to a list
#[utoipa::path(
    post,
    path = "/api/lists/{list_id}/",
    tag = "lists",
    params(
        ("list_id" = i64, Path, description = "List identifier")
    ),
    request_body(content(
        (NewItem = "application/x-www-form-urlencoded"),
        (NewItem = "multipart/form-data"),
        (NewItem = "application/json")
    )),
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Empty or duplicate item", body = ErrorResponse),
        (status = 404, description = "List not found", body = ErrorResponse)
    )
)]
pub async fn add_item(
    State(state): State<AppState>,
    ListPath(list_id): ListPath,
    ItemSubmission(new_item): ItemSubmission,
) -> Result<(StatusCode, Json<ItemResponse>)> {
    let item = state.list_service.add_item(list_id, new_item).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}
