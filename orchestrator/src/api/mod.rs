//! HTTP API assembly
//!
//! | Route | Method | Purpose |
//! |-------|--------|---------|
//! | `/orders/unified` | POST | Create a unified order (201 + full graph) |
//! | `/orders` | GET | List orders owned by the caller |
//! | `/orders/{order_id}` | GET | Single order with items and events |
//! | `/orders/integration/item-status` | POST | Downstream status callback |
//! | `/ws/orders` | GET | Realtime `order.updated` WebSocket |
//! | `/health` | GET | Liveness |

pub mod health;
pub mod integration;
pub mod orders;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::ServerState;
use crate::realtime;

/// Build the full application router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(orders::router())
        .merge(integration::router())
        .merge(health::router())
        .merge(realtime::socket::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
