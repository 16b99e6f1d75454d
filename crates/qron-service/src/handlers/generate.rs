//! In-app generation handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use qron_core::Qron;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::gate;
use crate::handlers::profiles::load_or_create_profile;
use crate::state::AppState;

/// Generation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Where the QRON should point.
    pub target_url: Option<String>,
    /// The user's style prompt.
    pub prompt: Option<String>,
    /// Chosen style preset.
    pub preset_id: Option<String>,
    /// Chosen generation mode.
    pub mode: Option<String>,
}

/// Generation response.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// The generated QRON.
    pub qron: QronSummary,
}

/// QRON summary returned to the generator UI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QronSummary {
    /// QRON id.
    pub id: String,
    /// Stylized image URL.
    pub image_url: String,
    /// Destination URL.
    pub destination_url: String,
    /// The enhanced prompt that was used.
    pub prompt: String,
}

impl From<&Qron> for QronSummary {
    fn from(qron: &Qron) -> Self {
        Self {
            id: qron.id.to_string(),
            image_url: qron.image_url.clone(),
            destination_url: qron.destination_url.clone(),
            prompt: qron.prompt.clone(),
        }
    }
}

/// Normalize a user-supplied URL: default to https when no scheme is given.
fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Generate a QRON for the authenticated user.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let target_url = body
        .target_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing required field: targetUrl".into()))?;

    let mode = body
        .mode
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing required field: mode".into()))?;

    let preset_id = body
        .preset_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing required field: presetId".into()))?;

    let prompt = body.prompt.as_deref().unwrap_or_default();

    let target_url = normalize_url(target_url);
    let profile = load_or_create_profile(&state, auth.user_id)?;

    tracing::debug!(
        user_id = %auth.user_id,
        mode = %mode,
        preset = %preset_id,
        "Processing generation request"
    );

    let qron = gate::generate_qron(&state, &profile, &target_url, prompt, mode, preset_id).await?;

    Ok(Json(GenerateResponse {
        qron: QronSummary::from(&qron),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_url_defaults_to_https() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
    }
}
