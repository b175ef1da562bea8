//! Item endpoints
//!
//! Input is validated by extractors and model constructors before the store
//! is called, so a bad id or a missing name never costs a database round trip.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::DataResponse;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, ValidItemId};
use crate::http::server::AppState;
use crate::models::{
    Item, ItemPayload, NewItem, PageMeta, Pagination, PaginationParams, SearchParams, SearchQuery,
};

/// List response with pagination metadata
#[derive(Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<Item>,
    pub pagination: PageMeta,
}

/// Search response echoing the term
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub data: Vec<Item>,
    pub search_query: String,
}

/// Single delete response with the row as it was
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: &'static str,
    pub deleted_item: Item,
}

/// Batch delete response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllResponse {
    pub success: bool,
    pub message: &'static str,
    pub deleted_count: u64,
}

/// POST /api/items - create an item
async fn create_item(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<ItemPayload>,
) -> Result<(StatusCode, Json<DataResponse<Item>>), ApiError> {
    let input = NewItem::try_from(payload)?;
    let item = state
        .store
        .create(input)
        .await
        .map_err(ApiError::db("Failed to create item"))?;

    tracing::info!(id = item.id, "Item created");
    Ok((StatusCode::CREATED, Json(DataResponse::ok(item))))
}

/// GET /api/items - list items, newest first
///
/// Count and page are separate reads; under concurrent writes they may
/// disagree slightly.
async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let page = Pagination::from(params);
    let result = state
        .store
        .list(page)
        .await
        .map_err(ApiError::db("Failed to fetch items"))?;

    let pagination = result.meta();
    Ok(Json(ListResponse {
        success: true,
        data: result.items,
        pagination,
    }))
}

/// GET /api/items/search?q= - case-insensitive substring search
async fn search_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = SearchQuery::new(params.q.as_deref())?;
    let items = state
        .store
        .search(&query)
        .await
        .map_err(ApiError::db("Failed to search items"))?;

    Ok(Json(SearchResponse {
        success: true,
        data: items,
        search_query: query.as_str().to_owned(),
    }))
}

/// GET /api/items/{id} - fetch one item
async fn get_item(
    State(state): State<Arc<AppState>>,
    ValidItemId(id): ValidItemId,
) -> Result<Json<DataResponse<Item>>, ApiError> {
    let item = state
        .store
        .get(id)
        .await
        .map_err(ApiError::db("Failed to fetch item"))?;

    Ok(Json(DataResponse::ok(item)))
}

/// PUT /api/items/{id} - replace name and value
async fn update_item(
    State(state): State<Arc<AppState>>,
    ValidItemId(id): ValidItemId,
    JsonBody(payload): JsonBody<ItemPayload>,
) -> Result<Json<DataResponse<Item>>, ApiError> {
    let input = NewItem::try_from(payload)?;
    let item = state
        .store
        .update(id, input)
        .await
        .map_err(ApiError::db("Failed to update item"))?;

    tracing::info!(id = item.id, "Item updated");
    Ok(Json(DataResponse::ok(item)))
}

/// DELETE /api/items/{id} - delete one item
async fn delete_item(
    State(state): State<Arc<AppState>>,
    ValidItemId(id): ValidItemId,
) -> Result<Json<DeleteResponse>, ApiError> {
    let item = state
        .store
        .delete(id)
        .await
        .map_err(ApiError::db("Failed to delete item"))?;

    tracing::info!(id = item.id, "Item deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: "Item deleted successfully",
        deleted_item: item,
    }))
}

/// DELETE /api/items - delete every item
///
/// WARNING: irreversible and unconditional. There is no confirmation step.
async fn delete_all_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeleteAllResponse>, ApiError> {
    let deleted_count = state
        .store
        .delete_all()
        .await
        .map_err(ApiError::db("Failed to delete items"))?;

    tracing::warn!(deleted_count, "All items deleted");
    Ok(Json(DeleteAllResponse {
        success: true,
        message: "All items deleted successfully",
        deleted_count,
    }))
}

/// Item routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/items",
            get(list_items).post(create_item).delete(delete_all_items),
        )
        .route("/api/items/search", get(search_items))
        .route(
            "/api/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
}
