//! WebSocket fan-out for order update signals
//!
//! `GET /ws/orders` upgrades to a WebSocket; every bus signal is forwarded
//! as `{"event": "order.updated", "orderId": "..."}`. No replay and no
//! delivery guarantee: a client that reconnects must re-fetch order state
//! through the query API instead of relying on missed frames.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Router;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use super::bus::{ORDER_UPDATED_EVENT, OrderUpdate};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws/orders", any(handle_orders_ws))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WsFrame<'a> {
    event: &'a str,
    order_id: &'a str,
}

async fn handle_orders_ws(
    State(state): State<ServerState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

async fn handle_ws_connection(socket: WebSocket, state: ServerState) {
    tracing::debug!("Realtime subscriber connected");

    let mut rx = state.notify.subscribe();
    let (mut ws_sink, mut ws_stream) = socket.split();

    loop {
        tokio::select! {
            update = rx.recv() => {
                match update {
                    Ok(OrderUpdate { order_id }) => {
                        let frame = WsFrame {
                            event: ORDER_UPDATED_EVENT,
                            order_id: &order_id,
                        };
                        let Ok(json) = serde_json::to_string(&frame) else {
                            continue;
                        };
                        if ws_sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    // Slow consumer skipped some signals; it will re-fetch
                    // state anyway, keep streaming from here.
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Realtime subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            incoming = ws_stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Inbound frames (pings, stray text) are ignored; this
                    // channel is push-only.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!("Realtime subscriber disconnected");
}
