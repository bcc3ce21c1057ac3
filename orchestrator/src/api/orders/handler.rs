//! Unified order API handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::{self, Identity};
use crate::core::{AppResult, ServerState};
use crate::orders::{NewOrder, OrderGraph, UnifiedOrder};

/// Create a unified order and dispatch its items.
///
/// Returns 201 with the full order graph even when every item failed to
/// dispatch; callers inspect per-item status for partial failure.
pub async fn create(
    State(state): State<ServerState>,
    identity: Identity,
    Json(input): Json<NewOrder>,
) -> AppResult<(StatusCode, Json<OrderGraph>)> {
    auth::authorize_create(&identity, &input.provider_id)?;
    let graph = state.manager.create_order(input).await?;
    Ok((StatusCode::CREATED, Json(graph)))
}

/// List orders owned by the caller; bypass roles see every order.
pub async fn list(
    State(state): State<ServerState>,
    identity: Identity,
) -> AppResult<Json<Vec<UnifiedOrder>>> {
    let provider_id = auth::authorize_list(&identity)?;
    let orders = state.manager.list_orders(provider_id.as_deref())?;
    Ok(Json(orders))
}

/// Get a single order with items and events.
pub async fn get_by_id(
    State(state): State<ServerState>,
    identity: Identity,
    Path(order_id): Path<String>,
) -> AppResult<Json<OrderGraph>> {
    let graph = state.manager.get_order_graph(&order_id)?;
    auth::authorize_read(&identity, &graph.order.provider_id)?;
    Ok(Json(graph))
}
