//! Unified order API: intake and queries

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/orders/unified", post(handler::create))
        .route("/orders", get(handler::list))
        .route("/orders/{order_id}", get(handler::get_by_id))
}
