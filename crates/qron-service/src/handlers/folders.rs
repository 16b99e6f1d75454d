//! Folder CRUD handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use qron_core::{Folder, FolderId};
use qron_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Folder as returned by the API.
#[derive(Debug, Serialize)]
pub struct FolderResponse {
    /// Folder id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Folder> for FolderResponse {
    fn from(folder: &Folder) -> Self {
        Self {
            id: folder.id.to_string(),
            name: folder.name.clone(),
            created_at: folder.created_at.to_rfc3339(),
        }
    }
}

/// Create/rename request.
#[derive(Debug, Deserialize)]
pub struct FolderRequest {
    /// Folder name.
    pub name: Option<String>,
}

fn require_name(body: &FolderRequest) -> Result<String, ApiError> {
    body.name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("Folder name cannot be empty".into()))
}

/// List the caller's folders, sorted by name.
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<FolderResponse>>, ApiError> {
    let folders = state.store.list_folders(&auth.user_id)?;
    Ok(Json(folders.iter().map(FolderResponse::from).collect()))
}

/// Create a folder.
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<FolderRequest>,
) -> Result<Json<FolderResponse>, ApiError> {
    let name = require_name(&body)?;
    let folder = Folder::new(auth.user_id, name);
    state.store.put_folder(&folder)?;

    tracing::info!(user_id = %auth.user_id, folder_id = %folder.id, "Folder created");

    Ok(Json(FolderResponse::from(&folder)))
}

/// Rename a folder.
pub async fn update_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<FolderRequest>,
) -> Result<Json<FolderResponse>, ApiError> {
    let name = require_name(&body)?;
    let folder_id: FolderId = id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("folder not found: {id}")))?;

    let mut folder = state
        .store
        .get_folder(&auth.user_id, &folder_id)?
        .ok_or_else(|| ApiError::NotFound(format!("folder not found: {id}")))?;

    folder.name = name;
    state.store.put_folder(&folder)?;

    Ok(Json(FolderResponse::from(&folder)))
}

/// Delete a folder. QRONs filed under it are left unfiled-by-orphaning.
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder_id: FolderId = id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("folder not found: {id}")))?;

    state.store.delete_folder(&auth.user_id, &folder_id)?;

    tracing::info!(user_id = %auth.user_id, folder_id = %folder_id, "Folder deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
