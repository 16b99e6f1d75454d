//! The entitlement and fulfillment gate.
//!
//! Drives the render → enhance → stylize → persist → count sequence for both
//! the in-app generation path and the webhook fulfillment path. Each external
//! call is a distinct failure point; the usage increment at the end is
//! best-effort because the artifact already exists by then.
//!
//! No idempotence is guaranteed: running the sequence twice with identical
//! inputs produces two QRON rows and two quota charges.

use qron_core::{check_entitlement, enhance_prompt, Denial, Profile, Qron, QronId, UserId};
use qron_store::Store;

use crate::error::ApiError;
use crate::fal::StyleError;
use crate::qr::QrError;
use crate::state::AppState;

/// Errors from the generation/fulfillment sequence.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The entitlement check denied the request.
    #[error(transparent)]
    Denied(#[from] Denial),

    /// The base QR render failed.
    #[error("QR render failed: {0}")]
    Render(#[from] QrError),

    /// The style transfer failed or returned no image.
    #[error("style transfer failed: {0}")]
    Style(#[from] StyleError),

    /// Style transfer is not configured on this deployment.
    #[error("style transfer not configured")]
    StyleUnavailable,

    /// Persisting the QRON failed. Usage is not charged in this case.
    #[error("persist failed: {0}")]
    Persist(#[from] qron_store::StoreError),
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Denied(denial) => denial.into(),
            GateError::Render(e) => Self::Upstream(e.to_string()),
            GateError::Style(e) => Self::Upstream(e.to_string()),
            GateError::StyleUnavailable => Self::Internal("style transfer not configured".into()),
            GateError::Persist(e) => e.into(),
        }
    }
}

/// Run the full entitled generation sequence for a signed-in user.
///
/// The entitlement check runs server-side here regardless of any client-side
/// pre-check; tier gating is a trust boundary.
///
/// # Errors
///
/// Returns a [`GateError`] naming the failed step. A denial carries the
/// reason; upstream and persistence failures surface as 500s.
pub async fn generate_qron(
    state: &AppState,
    profile: &Profile,
    target_url: &str,
    raw_prompt: &str,
    mode_id: &str,
    preset_id: &str,
) -> Result<Qron, GateError> {
    let grant = check_entitlement(profile, &state.catalog, mode_id, preset_id)?;

    let qron = run_pipeline(
        state,
        profile.user_id,
        grant.mode.id,
        Some(grant.preset.id.to_string()),
        target_url,
        raw_prompt,
        Some(grant.preset),
    )
    .await?;

    // Best-effort accounting: the artifact exists, so a failed increment is
    // logged rather than surfaced.
    match state.store.increment_generations(&profile.user_id) {
        Ok(used) => {
            tracing::info!(
                user_id = %profile.user_id,
                qron_id = %qron.id,
                generations_used = %used,
                "Generation recorded"
            );
        }
        Err(e) => {
            tracing::warn!(
                user_id = %profile.user_id,
                qron_id = %qron.id,
                error = %e,
                "Failed to record generation usage"
            );
        }
    }

    Ok(qron)
}

/// Run the paid fulfillment sequence for a completed checkout.
///
/// The entitlement check is skipped: payment itself is the entitlement for
/// this flow, and the inputs come from gateway-held metadata rather than any
/// client request. Usage is not counted against a quota.
///
/// # Errors
///
/// Returns a [`GateError`] naming the failed step. An unknown mode in the
/// metadata surfaces as a denial.
pub async fn fulfill_generation(
    state: &AppState,
    user_id: UserId,
    mode_id: &str,
    destination_url: &str,
    raw_prompt: &str,
) -> Result<Qron, GateError> {
    // Resolve the mode for its style qualifiers; metadata can in principle
    // carry a mode the catalog no longer knows.
    if state.catalog.mode(mode_id).is_none() {
        return Err(Denial::UnknownMode(mode_id.to_string()).into());
    }

    run_pipeline(
        state,
        user_id,
        mode_id,
        None,
        destination_url,
        raw_prompt,
        None,
    )
    .await
}

/// Steps 2-5: render the base QR, enhance the prompt, stylize, persist.
async fn run_pipeline(
    state: &AppState,
    user_id: UserId,
    mode_id: &str,
    preset_id: Option<String>,
    destination_url: &str,
    raw_prompt: &str,
    preset: Option<&qron_core::Preset>,
) -> Result<Qron, GateError> {
    let style = state.style.as_ref().ok_or(GateError::StyleUnavailable)?;
    let mode = state
        .catalog
        .mode(mode_id)
        .ok_or_else(|| GateError::Denied(Denial::UnknownMode(mode_id.to_string())))?;

    // The id is generated up front so the tracking link can be encoded in
    // the QR bitmap before the row exists.
    let qron_id = QronId::generate();
    let qr_content = state.tracking_link(&qron_id);

    let base_image = state.qr.render_data_url(&qr_content).await.map_err(|e| {
        tracing::error!(qron_id = %qron_id, error = %e, "Base QR render failed");
        e
    })?;

    let final_prompt = enhance_prompt(raw_prompt, mode, preset);

    let image_url = style
        .stylize(&base_image, &qr_content, &final_prompt)
        .await
        .map_err(|e| {
            tracing::error!(qron_id = %qron_id, error = %e, "Style transfer failed");
            e
        })?;

    let qron = Qron::new(
        qron_id,
        user_id,
        mode.id,
        preset_id,
        destination_url,
        qr_content,
        final_prompt,
        image_url,
    );

    state.store.put_qron(&qron)?;

    tracing::info!(
        qron_id = %qron.id,
        user_id = %user_id,
        mode = %mode.id,
        "QRON persisted"
    );

    Ok(qron)
}
