//! Integration API handlers - the asynchronous completion path
//!
//! Downstream services report sub-order progress here, independent of the
//! original dispatch request/response cycle.

use axum::{Json, extract::State};

use crate::auth::{self, Identity};
use crate::core::{AppResult, ServerState};
use crate::orders::{ItemStatusResult, ItemStatusUpdate};

/// Apply a status report from a trusted downstream service.
pub async fn item_status(
    State(state): State<ServerState>,
    identity: Identity,
    Json(update): Json<ItemStatusUpdate>,
) -> AppResult<Json<ItemStatusResult>> {
    auth::authorize_integration(&identity)?;
    let result = state.manager.apply_item_status(update)?;
    Ok(Json(result))
}
