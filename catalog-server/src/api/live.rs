//! Live submission endpoints
//!
//! Attachments are stored by the upload collaborator before this point; the
//! body only carries the resulting `imageRef`.

use super::extract::{JsonBody, RecordId};
use super::{collection, record, CollectionResponse, RecordResponse};
use crate::error::ApiResult;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use catalog_common::LiveSubmission;

/// GET /api/live-products
pub async fn list_live(State(state): State<AppState>) -> ApiResult<Json<Vec<LiveSubmission>>> {
    Ok(Json(state.service.list_live().await?))
}

/// POST /api/live-products
pub async fn create_live(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<(StatusCode, Json<RecordResponse<LiveSubmission>>)> {
    let submission = state.service.create_live(body).await?;
    Ok((StatusCode::CREATED, Json(record(submission))))
}

/// DELETE /api/live-products/:id - idempotent
pub async fn delete_live(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<Json<CollectionResponse<LiveSubmission>>> {
    let remaining = state.service.delete_live(id).await?;
    Ok(Json(collection(remaining)))
}
