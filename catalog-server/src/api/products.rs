//! Catalog product endpoints

use super::extract::{JsonBody, RecordId};
use super::{collection, record, CollectionResponse, RecordResponse};
use crate::error::ApiResult;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use catalog_common::{MergedView, Product};

/// GET /api/products - merged view (catalog, then live submissions)
pub async fn list_merged(State(state): State<AppState>) -> ApiResult<Json<MergedView>> {
    Ok(Json(state.service.merged_view().await?))
}

/// GET /api/products/:pid
pub async fn get_product(
    State(state): State<AppState>,
    RecordId(pid): RecordId,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.service.get_product(pid).await?))
}

/// POST /api/products - id is assigned by the store
pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<(StatusCode, Json<RecordResponse<Product>>)> {
    let product = state.service.create_product(body).await?;
    Ok((StatusCode::CREATED, Json(record(product))))
}

/// PUT|PATCH /api/products/:pid - shallow merge of the supplied fields
pub async fn update_product(
    State(state): State<AppState>,
    RecordId(pid): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<Json<RecordResponse<Product>>> {
    let product = state.service.update_product(pid, body).await?;
    Ok(Json(record(product)))
}

/// DELETE /api/products/:pid - idempotent
pub async fn delete_product(
    State(state): State<AppState>,
    RecordId(pid): RecordId,
) -> ApiResult<Json<CollectionResponse<Product>>> {
    let remaining = state.service.delete_product(pid).await?;
    Ok(Json(collection(remaining)))
}
