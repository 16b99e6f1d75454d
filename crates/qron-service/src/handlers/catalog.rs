//! Catalog handlers: modes, presets, and plans.
//!
//! Catalog data is public and immutable; clients use it to populate pickers
//! and to run their advisory tier checks. The server re-checks everything.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use qron_core::{Mode, Plan, Preset};

use crate::state::AppState;

/// List all generation modes.
pub async fn list_modes(State(state): State<Arc<AppState>>) -> Json<Vec<Mode>> {
    Json(state.catalog.modes().to_vec())
}

/// List all style presets.
pub async fn list_presets(State(state): State<Arc<AppState>>) -> Json<Vec<Preset>> {
    Json(state.catalog.presets().to_vec())
}

/// List all subscription plans.
pub async fn list_plans(State(state): State<Arc<AppState>>) -> Json<Vec<Plan>> {
    Json(state.catalog.plans().to_vec())
}
