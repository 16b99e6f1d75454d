//! Checkout handler.
//!
//! Prices the request from the catalog, opens a hosted checkout session with
//! the purchase intent round-tripped as session metadata, and persists a
//! pending order keyed by the session id so the purchase is visible locally
//! before the webhook arrives.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use qron_core::{Order, PurchaseIntent};
use qron_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::stripe::{CheckoutSession, LineItem, StripeClient};

/// Checkout request. Either a one-off generation purchase
/// (`mode` + `url` + `prompt`) or a plan upgrade (`planId`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Generation mode for a one-off purchase.
    pub mode: Option<String>,
    /// Destination URL for a one-off purchase.
    pub url: Option<String>,
    /// Style prompt for a one-off purchase.
    pub prompt: Option<String>,
    /// Plan id for a subscription upgrade.
    pub plan_id: Option<String>,
    /// Customer email for delivery.
    pub email: Option<String>,
}

/// Checkout response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Hosted checkout URL to redirect the user to.
    pub url: String,
    /// The gateway's checkout session id.
    pub session_id: String,
    /// The local pending order id.
    pub order_id: String,
}

/// Open a checkout session.
///
/// Authentication is optional: signed-in purchases carry the user id in the
/// session metadata so fulfillment can attach the QRON to the account; guest
/// purchases are delivered by email only.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    auth: Option<AuthUser>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let stripe = state
        .stripe
        .as_ref()
        .ok_or_else(|| ApiError::Internal("payment gateway not configured".into()))?;

    let email = body
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing required field: email".into()))?;

    let user_id = auth.as_ref().map(|a| a.user_id);
    let user_id_string = user_id.map(|id| id.to_string());

    let success_url = format!(
        "{}/success?session_id={{CHECKOUT_SESSION_ID}}",
        state.config.frontend_url.trim_end_matches('/')
    );
    let cancel_url = state.config.frontend_url.clone();

    // Plan upgrades and one-off generation purchases share the session
    // machinery but carry different metadata.
    let (line_item, metadata, intent) = if let Some(plan_id) = body.plan_id.as_deref() {
        let plan = state
            .catalog
            .plan(plan_id)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid plan: {plan_id}")))?;

        if plan.price_cents == 0 {
            return Err(ApiError::BadRequest(format!(
                "plan {plan_id} has no checkout"
            )));
        }

        let line_item = LineItem {
            name: format!("QRON {} Plan", plan.name),
            description: format!("{} subscription for QRON", plan.name),
            amount_cents: plan.price_cents,
        };

        let mut metadata: Vec<(&str, String)> = vec![
            ("plan_id", plan.id.to_string()),
            ("email", email.to_string()),
        ];
        if let Some(ref uid) = user_id_string {
            metadata.push(("user_id", uid.clone()));
        }

        (
            line_item,
            metadata,
            PurchaseIntent::PlanUpgrade {
                plan: plan.id.to_string(),
            },
        )
    } else {
        let mode_id = body
            .mode
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing required field: mode".into()))?;
        let url = body
            .url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing required field: url".into()))?;
        let prompt = body
            .prompt
            .as_deref()
            .ok_or_else(|| ApiError::BadRequest("Missing required field: prompt".into()))?;

        let mode = state
            .catalog
            .mode(mode_id)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid mode: {mode_id}")))?;

        let line_item = LineItem {
            name: format!("QRON {} QR Code", mode.name.to_uppercase()),
            description: format!("AI-generated QR code pointing to: {url}"),
            amount_cents: mode.price_cents,
        };

        let mut metadata: Vec<(&str, String)> = vec![
            ("mode", mode.id.to_string()),
            ("url", url.to_string()),
            ("prompt", prompt.to_string()),
            ("email", email.to_string()),
        ];
        if let Some(ref uid) = user_id_string {
            metadata.push(("user_id", uid.clone()));
        }

        (
            line_item,
            metadata,
            PurchaseIntent::Generation {
                mode: mode.id.to_string(),
                destination_url: url.to_string(),
                prompt: prompt.to_string(),
            },
        )
    };

    let metadata_refs: Vec<(&str, &str)> =
        metadata.iter().map(|(k, v)| (*k, v.as_str())).collect();

    let session = create_session(stripe, &line_item, email, &success_url, &cancel_url, &metadata_refs)
        .await?;

    let checkout_url = session
        .url
        .clone()
        .ok_or_else(|| ApiError::Upstream("gateway returned no checkout URL".into()))?;

    let order = Order::new(&session.id, email, user_id, intent);
    state.store.put_order(&order)?;

    tracing::info!(
        order_id = %order.id,
        session_id = %session.id,
        "Checkout session created"
    );

    Ok(Json(CheckoutResponse {
        url: checkout_url,
        session_id: session.id,
        order_id: order.id.to_string(),
    }))
}

async fn create_session(
    stripe: &StripeClient,
    line_item: &LineItem,
    email: &str,
    success_url: &str,
    cancel_url: &str,
    metadata: &[(&str, &str)],
) -> Result<CheckoutSession, ApiError> {
    stripe
        .create_checkout_session(line_item, email, success_url, cancel_url, metadata)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Checkout session creation failed");
            ApiError::Upstream(e.to_string())
        })
}
