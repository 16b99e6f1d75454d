//! QRON gallery handlers: listing, detail, folder and tag assignment.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use qron_core::{FolderId, Qron, QronId, TagId};
use qron_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Default page size for listings.
const DEFAULT_LIMIT: usize = 50;

/// Maximum page size for listings.
const MAX_LIMIT: usize = 200;

/// Full QRON record as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QronResponse {
    /// QRON id.
    pub id: String,
    /// Generation mode.
    pub mode: String,
    /// Preset used, when one was chosen.
    pub preset: Option<String>,
    /// Stylized image URL.
    pub image_url: String,
    /// Destination URL.
    pub destination_url: String,
    /// The content encoded in the QR bitmap.
    pub qr_content: String,
    /// The enhanced prompt that was used.
    pub prompt: String,
    /// Redirect-tracking hit count.
    pub scan_count: u64,
    /// Folder reference, if filed.
    pub folder_id: Option<String>,
    /// Assigned tag ids. Populated on detail fetches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<String>>,
    /// Created timestamp.
    pub created_at: String,
}

impl QronResponse {
    fn from_qron(qron: &Qron, tag_ids: Option<Vec<TagId>>) -> Self {
        Self {
            id: qron.id.to_string(),
            mode: qron.mode.clone(),
            preset: qron.preset.clone(),
            image_url: qron.image_url.clone(),
            destination_url: qron.destination_url.clone(),
            qr_content: qron.qr_content.clone(),
            prompt: qron.prompt.clone(),
            scan_count: qron.scan_count,
            folder_id: qron.folder_id.map(|id| id.to_string()),
            tag_ids: tag_ids.map(|ids| ids.iter().map(ToString::to_string).collect()),
            created_at: qron.created_at.to_rfc3339(),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Page size.
    pub limit: Option<usize>,
    /// Offset into the newest-first listing.
    pub offset: Option<usize>,
}

/// Listing response.
#[derive(Debug, Serialize)]
pub struct QronListResponse {
    /// The caller's QRONs, newest first.
    pub qrons: Vec<QronResponse>,
}

/// Load a QRON and verify the caller owns it. Non-owned ids read as absent.
pub(crate) fn load_owned_qron(
    state: &AppState,
    auth: &AuthUser,
    id: &str,
) -> Result<Qron, ApiError> {
    let qron_id: QronId = id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("QRON not found: {id}")))?;

    let qron = state
        .store
        .get_qron(&qron_id)?
        .filter(|q| q.user_id == auth.user_id)
        .ok_or_else(|| ApiError::NotFound(format!("QRON not found: {id}")))?;

    Ok(qron)
}

/// List the caller's QRONs, newest first.
pub async fn list_qrons(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<QronListResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);

    let qrons = state
        .store
        .list_qrons_by_user(&auth.user_id, limit, offset)?
        .iter()
        .map(|q| QronResponse::from_qron(q, None))
        .collect();

    Ok(Json(QronListResponse { qrons }))
}

/// Fetch one QRON with its tag assignments.
pub async fn get_qron(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<QronResponse>, ApiError> {
    let qron = load_owned_qron(&state, &auth, &id)?;
    let tags = state.store.list_qron_tags(&qron.id)?;
    Ok(Json(QronResponse::from_qron(&qron, Some(tags))))
}

/// Folder assignment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFolderRequest {
    /// Target folder id, or `null` to unfile.
    pub folder_id: Option<String>,
}

/// Assign or clear the folder on a QRON.
pub async fn set_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<SetFolderRequest>,
) -> Result<Json<QronResponse>, ApiError> {
    let qron = load_owned_qron(&state, &auth, &id)?;

    let folder_id = match body.folder_id.as_deref() {
        Some(raw) => {
            let folder_id: FolderId = raw
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("invalid folder id: {raw}")))?;
            // The folder must exist and belong to the caller.
            state
                .store
                .get_folder(&auth.user_id, &folder_id)?
                .ok_or_else(|| ApiError::NotFound(format!("folder not found: {raw}")))?;
            Some(folder_id)
        }
        None => None,
    };

    state.store.set_qron_folder(&qron.id, folder_id)?;

    let updated = state
        .store
        .get_qron(&qron.id)?
        .ok_or_else(|| ApiError::Internal("QRON vanished during update".into()))?;

    Ok(Json(QronResponse::from_qron(&updated, None)))
}

/// Assign a tag to a QRON.
pub async fn add_tag(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path((id, tag_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let qron = load_owned_qron(&state, &auth, &id)?;

    let tag_id: TagId = tag_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid tag id: {tag_id}")))?;
    state
        .store
        .get_tag(&auth.user_id, &tag_id)?
        .ok_or_else(|| ApiError::NotFound(format!("tag not found: {tag_id}")))?;

    state.store.tag_qron(&qron.id, &tag_id)?;

    Ok(Json(serde_json::json!({ "tagged": true })))
}

/// Remove a tag assignment from a QRON.
pub async fn remove_tag(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path((id, tag_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let qron = load_owned_qron(&state, &auth, &id)?;

    let tag_id: TagId = tag_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid tag id: {tag_id}")))?;

    state.store.untag_qron(&qron.id, &tag_id)?;

    Ok(Json(serde_json::json!({ "tagged": false })))
}
