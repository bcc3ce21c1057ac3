//! Internal notification bus
//!
//! The order manager publishes `{orderId}` here after every committed
//! mutation; the realtime transport layer subscribes and fans out to
//! connected clients. Fire-and-forget, at-most-once: a send with no
//! subscribers or a lagged receiver is not an error. Consumers must
//! re-fetch full order state, the signal carries nothing but the id.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Channel name on the realtime transport
pub const ORDER_UPDATED_EVENT: &str = "order.updated";

const CHANNEL_CAPACITY: usize = 1024;

/// State-change signal for one unified order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub order_id: String,
}

/// Broadcast bus for order update signals
#[derive(Debug, Clone)]
pub struct NotifyBus {
    tx: broadcast::Sender<OrderUpdate>,
}

impl NotifyBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish a signal for the given order. Never fails; absence of
    /// subscribers simply drops the signal.
    pub fn publish(&self, order_id: &str) {
        let _ = self.tx.send(OrderUpdate {
            order_id: order_id.to_string(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderUpdate> {
        self.tx.subscribe()
    }
}

impl Default for NotifyBus {
    fn default() -> Self {
        Self::new()
    }
}
