//! Payment gateway webhook handler.
//!
//! The gateway signs every event; the signature is verified before the
//! payload is trusted, and an invalid or missing signature is rejected with
//! no side effects. Once the signature is valid the handler always
//! acknowledges with `{received: true}`, even when fulfillment fails, so the
//! gateway does not retry indefinitely. Fulfillment failures are recorded on
//! the order for manual reconciliation; there is no automatic retry or
//! refund.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use qron_core::{Qron, UserId};
use qron_store::Store;

use crate::error::ApiError;
use crate::gate;
use crate::handlers::profiles::load_or_create_profile;
use crate::state::AppState;
use crate::stripe::{CheckoutSession, StripeError, WebhookEvent};

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was processed.
    pub received: bool,
}

/// Handle payment gateway webhooks.
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    let stripe = state
        .stripe
        .as_ref()
        .ok_or_else(|| ApiError::Internal("payment gateway not configured".into()))?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing signature".into()))?;

    stripe
        .verify_webhook_signature(&body, signature)
        .map_err(|e| match e {
            StripeError::Configuration(msg) => {
                tracing::error!(error = %msg, "Webhook signing secret not configured");
                ApiError::Internal(msg)
            }
            _ => {
                tracing::warn!(error = %e, "Invalid webhook signature");
                ApiError::BadRequest("Invalid webhook signature".into())
            }
        })?;

    let event: WebhookEvent =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(
        event_type = %event.event_type,
        event_id = %event.id,
        "Received gateway webhook"
    );

    match event.event_type.as_str() {
        "checkout.session.completed" => {
            // The signature is verified, so the event is acknowledged no
            // matter what happens downstream; a lost acknowledgement would
            // only make the gateway retry a fulfillment that already failed.
            if let Err(e) = handle_checkout_completed(&state, &event.data.object).await {
                tracing::error!(
                    event_id = %event.id,
                    error = %e,
                    "Checkout fulfillment failed"
                );
            }
        }
        _ => {
            tracing::debug!(event_type = %event.event_type, "Unhandled gateway event");
        }
    }

    Ok(Json(WebhookResponse { received: true }))
}

/// Errors surfaced during fulfillment. Logged, never returned to the gateway.
#[derive(Debug, thiserror::Error)]
enum FulfillError {
    #[error("malformed session payload: {0}")]
    Payload(String),

    #[error("missing metadata key: {0}")]
    MissingMetadata(&'static str),

    #[error(transparent)]
    Gate(#[from] gate::GateError),

    #[error("store error: {0}")]
    Store(#[from] qron_store::StoreError),

    #[error("email delivery failed: {0}")]
    Email(String),

    #[error("unknown plan: {0}")]
    UnknownPlan(String),
}

/// Fulfill a completed checkout session.
async fn handle_checkout_completed(
    state: &AppState,
    object: &serde_json::Value,
) -> Result<(), FulfillError> {
    let session: CheckoutSession = serde_json::from_value(object.clone())
        .map_err(|e| FulfillError::Payload(e.to_string()))?;

    let payment_status = session.payment_status.as_deref().unwrap_or("unknown");
    if payment_status != "paid" {
        tracing::info!(
            session_id = %session.id,
            payment_status = %payment_status,
            "Checkout session not paid yet, skipping"
        );
        return Ok(());
    }

    // Purchase intent is re-read from the gateway-held metadata, not from
    // any client request: the checkout call and this webhook are unrelated
    // invocations.
    let metadata = &session.metadata;
    let meta = |key: &'static str| {
        metadata
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    let email = meta("email")
        .or_else(|| session.customer_email.clone())
        .ok_or(FulfillError::MissingMetadata("email"))?;

    let user_id = meta("user_id").and_then(|s| s.parse::<UserId>().ok());

    let result = if let Some(plan_id) = meta("plan_id") {
        fulfill_plan_upgrade(state, &plan_id, user_id).await
    } else {
        fulfill_paid_generation(state, metadata, &email, user_id).await
    };

    // Transition the local order row for reconciliation. Orders created by
    // other deployments of the checkout route may be absent; fulfillment
    // does not depend on them.
    match state.store.get_order_by_session(&session.id) {
        Ok(Some(mut order)) => {
            match &result {
                Ok(qron_id) => order.fulfill(*qron_id),
                Err(e) => order.fail(e.to_string()),
            }
            if let Err(e) = state.store.put_order(&order) {
                tracing::warn!(
                    session_id = %session.id,
                    error = %e,
                    "Failed to update order status"
                );
            } else {
                tracing::info!(
                    order_id = %order.id,
                    session_id = %session.id,
                    status = ?order.status,
                    "Order updated"
                );
            }
        }
        Ok(None) => {
            tracing::warn!(session_id = %session.id, "No local order for session");
        }
        Err(e) => {
            tracing::warn!(session_id = %session.id, error = %e, "Order lookup failed");
        }
    }

    result.map(|_| ())
}

/// Run steps 2-5 of the generation sequence plus email delivery.
async fn fulfill_paid_generation(
    state: &AppState,
    metadata: &serde_json::Value,
    email: &str,
    user_id: Option<UserId>,
) -> Result<Option<qron_core::QronId>, FulfillError> {
    let mode = metadata
        .get("mode")
        .and_then(|v| v.as_str())
        .ok_or(FulfillError::MissingMetadata("mode"))?;
    let url = metadata
        .get("url")
        .and_then(|v| v.as_str())
        .ok_or(FulfillError::MissingMetadata("url"))?;
    let prompt = metadata
        .get("prompt")
        .and_then(|v| v.as_str())
        .ok_or(FulfillError::MissingMetadata("prompt"))?;

    // Guest purchases get a fresh owner id; the order row ties it back to
    // the session for reconciliation.
    let owner = user_id.unwrap_or_else(UserId::generate);

    let qron: Qron = gate::fulfill_generation(state, owner, mode, url, prompt).await?;

    send_delivery_email(state, email, &qron).await?;

    tracing::info!(
        qron_id = %qron.id,
        email = %email,
        "QRON generated and delivered"
    );

    Ok(Some(qron.id))
}

/// Apply a purchased plan to the buyer's profile.
async fn fulfill_plan_upgrade(
    state: &AppState,
    plan_id: &str,
    user_id: Option<UserId>,
) -> Result<Option<qron_core::QronId>, FulfillError> {
    let plan = state
        .catalog
        .plan(plan_id)
        .ok_or_else(|| FulfillError::UnknownPlan(plan_id.to_string()))?;

    let user_id = user_id.ok_or(FulfillError::MissingMetadata("user_id"))?;

    let mut profile =
        load_or_create_profile(state, user_id).map_err(|e| FulfillError::Payload(e.to_string()))?;
    profile.apply_plan(plan);
    state.store.put_profile(&profile)?;

    tracing::info!(
        user_id = %user_id,
        plan = %plan.id,
        "Plan applied"
    );

    Ok(None)
}

/// Hand the finished image to the notification sender. One attempt only.
async fn send_delivery_email(state: &AppState, to: &str, qron: &Qron) -> Result<(), FulfillError> {
    let Some(email) = &state.email else {
        tracing::warn!("Email sender not configured - skipping delivery email");
        return Ok(());
    };

    email
        .send_delivery(to, &qron.image_url, &qron.mode, &qron.destination_url)
        .await
        .map_err(|e| FulfillError::Email(e.to_string()))
}
