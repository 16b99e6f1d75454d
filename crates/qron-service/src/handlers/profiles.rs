//! Profile handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use qron_core::{Profile, UserId};
use qron_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Profile response.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// User ID.
    pub user_id: String,
    /// Email, when known.
    pub email: Option<String>,
    /// Subscription tier.
    pub tier: qron_core::Tier,
    /// Generations consumed this period.
    pub generations_used: u32,
    /// Period allowance.
    pub generations_limit: u32,
    /// Remaining generations. `null` means unlimited.
    pub remaining: Option<u32>,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id.to_string(),
            email: profile.email.clone(),
            tier: profile.tier,
            generations_used: profile.generations_used,
            generations_limit: profile.generations_limit,
            remaining: profile.remaining(),
            created_at: profile.created_at.to_rfc3339(),
        }
    }
}

/// Load a user's profile, creating a free-tier one on first touch.
pub(crate) fn load_or_create_profile(
    state: &AppState,
    user_id: UserId,
) -> Result<Profile, ApiError> {
    if let Some(profile) = state.store.get_profile(&user_id)? {
        return Ok(profile);
    }

    let profile = Profile::new(user_id);
    state.store.put_profile(&profile)?;
    tracing::info!(user_id = %user_id, "Profile created");
    Ok(profile)
}

/// Get the current user's profile.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = load_or_create_profile(&state, auth.user_id)?;
    Ok(Json(ProfileResponse::from(&profile)))
}
