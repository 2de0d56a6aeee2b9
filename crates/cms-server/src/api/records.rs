// ABOUTME: CRUD handlers shared by itineraries, travelogues, and trip plans.
// ABOUTME: Each handler is generic over the record model; the model's kind picks the collection.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use cms_core::{Document, Patch, RecordModel};
use serde_json::Value;

use crate::api::JsonBody;
use crate::app_state::SharedState;
use crate::error::ApiError;

fn not_found<M: RecordModel>(id: &str) -> ApiError {
    ApiError::NotFound(format!("{} {} not found", M::KIND, id))
}

/// POST /{kind} - Validate the body against the model and create the record.
pub async fn create_record<M: RecordModel>(
    State(state): State<SharedState>,
    JsonBody(record): JsonBody<M>,
) -> Result<impl IntoResponse, ApiError> {
    let doc = record.into_document().map_err(ApiError::Encode)?;
    let created = state.records.create(M::KIND, doc).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /{kind} - List every record of the kind.
pub async fn list_records<M: RecordModel>(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(state.records.list(M::KIND).await?))
}

/// GET /{kind}/{id} - Fetch one record by application id.
pub async fn get_record<M: RecordModel>(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    state
        .records
        .get(M::KIND, &id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<M>(&id))
}

/// PUT /{kind}/{id} - Apply a partial update. Null fields are ignored and
/// `"$unset": [...]` removes fields.
pub async fn update_record<M: RecordModel>(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Document>, ApiError> {
    let patch = Patch::from_json(body)?;
    state
        .records
        .update(M::KIND, &id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<M>(&id))
}

/// DELETE /{kind}/{id} - Remove one record. Deleting a missing record is not
/// an error; the body reports whether anything was removed.
pub async fn delete_record<M: RecordModel>(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = state.records.delete(M::KIND, &id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
