//! Redirect rule handlers.
//!
//! Rules are attached to a QRON and evaluated by the public scan endpoint in
//! ascending priority order; the first active, in-window rule that carries a
//! `redirect_url` wins.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use qron_core::{RedirectRule, RuleId, RuleKind};
use qron_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::qrons::load_owned_qron;
use crate::state::AppState;

/// Redirect rule as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResponse {
    /// Rule id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Evaluation priority; lower evaluates first.
    pub priority: i32,
    /// What the rule keys on.
    pub kind: RuleKind,
    /// Rule configuration.
    pub configuration: serde_json::Value,
    /// Whether the rule is active.
    pub is_active: bool,
    /// Optional window start.
    pub start_time: Option<String>,
    /// Optional window end.
    pub end_time: Option<String>,
    /// A/B variant label.
    pub a_b_variant: Option<String>,
    /// A/B weight.
    pub a_b_weight: Option<u32>,
}

impl From<&RedirectRule> for RuleResponse {
    fn from(rule: &RedirectRule) -> Self {
        Self {
            id: rule.id.to_string(),
            name: rule.name.clone(),
            priority: rule.priority,
            kind: rule.kind,
            configuration: rule.configuration.clone(),
            is_active: rule.is_active,
            start_time: rule.start_time.map(|t| t.to_rfc3339()),
            end_time: rule.end_time.map(|t| t.to_rfc3339()),
            a_b_variant: rule.a_b_variant.clone(),
            a_b_weight: rule.a_b_weight,
        }
    }
}

/// Rule creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRequest {
    /// Display name.
    pub name: Option<String>,
    /// Evaluation priority. Defaults to 100.
    pub priority: Option<i32>,
    /// What the rule keys on. Defaults to `default`.
    pub kind: Option<RuleKind>,
    /// Rule configuration; carries `redirect_url` and kind-specific keys.
    pub configuration: Option<serde_json::Value>,
    /// Whether the rule starts active. Defaults to true.
    pub is_active: Option<bool>,
    /// Optional window start.
    pub start_time: Option<DateTime<Utc>>,
    /// Optional window end.
    pub end_time: Option<DateTime<Utc>>,
    /// A/B variant label.
    pub a_b_variant: Option<String>,
    /// A/B weight.
    pub a_b_weight: Option<u32>,
}

/// List the redirect rules attached to a QRON, in priority order.
pub async fn list_rules(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<RuleResponse>>, ApiError> {
    let qron = load_owned_qron(&state, &auth, &id)?;
    let rules = state.store.list_rules(&qron.id)?;
    Ok(Json(rules.iter().map(RuleResponse::from).collect()))
}

/// Attach a redirect rule to a QRON.
pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<RuleRequest>,
) -> Result<Json<RuleResponse>, ApiError> {
    let qron = load_owned_qron(&state, &auth, &id)?;

    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing required field: name".into()))?;

    let configuration = body
        .configuration
        .clone()
        .ok_or_else(|| ApiError::BadRequest("Missing required field: configuration".into()))?;

    if !configuration.is_object() {
        return Err(ApiError::BadRequest(
            "configuration must be an object".into(),
        ));
    }

    let rule = RedirectRule {
        id: RuleId::generate(),
        qron_id: qron.id,
        user_id: auth.user_id,
        name: name.to_string(),
        priority: body.priority.unwrap_or(100),
        kind: body.kind.unwrap_or(RuleKind::Default),
        configuration,
        is_active: body.is_active.unwrap_or(true),
        start_time: body.start_time,
        end_time: body.end_time,
        a_b_variant: body.a_b_variant,
        a_b_weight: body.a_b_weight,
    };

    state.store.put_rule(&rule)?;

    tracing::info!(
        user_id = %auth.user_id,
        qron_id = %qron.id,
        rule_id = %rule.id,
        kind = ?rule.kind,
        "Redirect rule created"
    );

    Ok(Json(RuleResponse::from(&rule)))
}

/// Remove a redirect rule from a QRON.
pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path((id, rule_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let qron = load_owned_qron(&state, &auth, &id)?;

    let rule_id: RuleId = rule_id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("rule not found: {rule_id}")))?;

    state.store.delete_rule(&qron.id, &rule_id)?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
