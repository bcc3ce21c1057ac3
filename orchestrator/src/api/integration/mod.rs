//! Integration API: trusted downstream callbacks

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/orders/integration/item-status", post(handler::item_status))
}
