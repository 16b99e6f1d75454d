//! Public scan endpoint.
//!
//! A QRON's bitmap encodes a tracking link rather than the destination URL
//! itself, so every scan lands here first. The hit is counted, the QRON's
//! redirect rules are evaluated in priority order, and the scanner is sent
//! on with a 302 to the winning target or the QRON's destination URL.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use qron_core::QronId;
use qron_store::Store;

use crate::error::ApiError;
use crate::state::AppState;

/// Resolve a scan to its redirect target and send the scanner on.
pub async fn scan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let qron_id: QronId = id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("QRON not found: {id}")))?;

    let qron = match state.store.record_scan(&qron_id) {
        Ok(qron) => qron,
        Err(qron_store::StoreError::NotFound) => {
            return Err(ApiError::NotFound(format!("QRON not found: {id}")));
        }
        Err(e) => return Err(e.into()),
    };

    let target = match state.store.list_rules(&qron.id) {
        Ok(rules) => {
            let now = Utc::now();
            rules
                .iter()
                .find(|r| r.applies_at(now) && r.redirect_url().is_some())
                .and_then(|r| r.redirect_url())
                .map(str::to_string)
        }
        // A broken rule read downgrades to the plain destination; the scan
        // itself must still land somewhere.
        Err(e) => {
            tracing::warn!(qron_id = %qron.id, error = %e, "Rule evaluation failed");
            None
        }
    };

    let location = target.unwrap_or_else(|| qron.destination_url.clone());

    tracing::debug!(
        qron_id = %qron.id,
        scan_count = %qron.scan_count,
        location = %location,
        "Scan redirected"
    );

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
