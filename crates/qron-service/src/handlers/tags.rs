//! Tag CRUD handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use qron_core::{Tag, TagId};
use qron_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Tag as returned by the API.
#[derive(Debug, Serialize)]
pub struct TagResponse {
    /// Tag id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Tag> for TagResponse {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id.to_string(),
            name: tag.name.clone(),
            created_at: tag.created_at.to_rfc3339(),
        }
    }
}

/// Create/rename request.
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    /// Tag name.
    pub name: Option<String>,
}

fn require_name(body: &TagRequest) -> Result<String, ApiError> {
    body.name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("Tag name cannot be empty".into()))
}

/// List the caller's tags, sorted by name.
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = state.store.list_tags(&auth.user_id)?;
    Ok(Json(tags.iter().map(TagResponse::from).collect()))
}

/// Create a tag.
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<TagRequest>,
) -> Result<Json<TagResponse>, ApiError> {
    let name = require_name(&body)?;
    let tag = Tag::new(auth.user_id, name);
    state.store.put_tag(&tag)?;

    tracing::info!(user_id = %auth.user_id, tag_id = %tag.id, "Tag created");

    Ok(Json(TagResponse::from(&tag)))
}

/// Rename a tag.
pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<TagRequest>,
) -> Result<Json<TagResponse>, ApiError> {
    let name = require_name(&body)?;
    let tag_id: TagId = id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("tag not found: {id}")))?;

    let mut tag = state
        .store
        .get_tag(&auth.user_id, &tag_id)?
        .ok_or_else(|| ApiError::NotFound(format!("tag not found: {id}")))?;

    tag.name = name;
    state.store.put_tag(&tag)?;

    Ok(Json(TagResponse::from(&tag)))
}

/// Delete a tag. Assignments on QRONs become dangling and read as absent.
pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tag_id: TagId = id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("tag not found: {id}")))?;

    state.store.delete_tag(&auth.user_id, &tag_id)?;

    tracing::info!(user_id = %auth.user_id, tag_id = %tag_id, "Tag deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
