//! WebSocket support for live search and trending snapshots.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::search::SearchStateResponse;
use super::trending::TrendingResponse;
use crate::metrics::{
    WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_MESSAGES_RECEIVED, WS_MESSAGES_SENT,
};
use crate::state::AppState;

/// WebSocket message sent to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Search state changed.
    SearchState { state: SearchStateResponse },
    /// Trending ranking changed.
    Trending { trending: TrendingResponse },
}

impl WsMessage {
    fn type_label(&self) -> &'static str {
        match self {
            WsMessage::SearchState { .. } => "search_state",
            WsMessage::Trending { .. } => "trending",
        }
    }
}

/// WebSocket message accepted from clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Raw query text changed.
    QueryChanged { query: String },
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut search_rx = state.search().subscribe_state();
    let mut trending_rx = state.search().subscribe_trending();

    // Track connection metrics
    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    let forward_state = Arc::clone(&state);
    let send_task = tokio::spawn(async move {
        let images = forward_state.image_base_url();

        // Current snapshots first, then every change
        search_rx.mark_changed();
        trending_rx.mark_changed();

        loop {
            let msg = tokio::select! {
                changed = search_rx.changed() => {
                    if changed.is_err() {
                        debug!("Search state channel closed");
                        break;
                    }
                    let snapshot = search_rx.borrow_and_update().clone();
                    WsMessage::SearchState {
                        state: SearchStateResponse::from_state(&snapshot, images),
                    }
                }
                changed = trending_rx.changed() => {
                    if changed.is_err() {
                        debug!("Trending channel closed");
                        break;
                    }
                    let ranking = trending_rx.borrow_and_update().clone();
                    WsMessage::Trending {
                        trending: TrendingResponse::from_ranking(&ranking, images),
                    }
                }
            };

            WS_MESSAGES_SENT.with_label_values(&[msg.type_label()]).inc();

            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize WsMessage: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from client
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::QueryChanged { query }) => {
                    WS_MESSAGES_RECEIVED
                        .with_label_values(&["query_changed"])
                        .inc();
                    if let Err(e) = state.search().set_query(query) {
                        warn!("Dropping query from WebSocket client: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    WS_MESSAGES_RECEIVED.with_label_values(&["invalid"]).inc();
                    debug!("Ignoring malformed client message: {}", e);
                }
            },
            Ok(_) => {
                // Ping/pong is handled by axum
            }
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    // Clean up
    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_parsing() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"query_changed","query":"batman"}"#).unwrap();
        let ClientMessage::QueryChanged { query } = msg;
        assert_eq!(query, "batman");
    }

    #[test]
    fn test_unknown_client_message_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type":"subscribe"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_trending_message_shape() {
        let msg = WsMessage::Trending {
            trending: TrendingResponse { entries: vec![] },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "trending");
        assert!(json["trending"]["entries"].as_array().unwrap().is_empty());
    }
}
