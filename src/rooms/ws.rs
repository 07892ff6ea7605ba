use axum::{debug_handler, extract::{State, WebSocketUpgrade, ws::{Message, WebSocket}}, response::IntoResponse};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{events::ClientEvent, relay::RelayHandle};

#[debug_handler(state = crate::AppState)]
pub async fn room_ws(
    State(relay): State<RelayHandle>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |stream| serve_connection(stream, relay))
}

async fn serve_connection(stream: WebSocket, relay: RelayHandle) {
    let conn = Uuid::now_v7();
    let mut inbox = relay.connect(conn);
    let (mut sender, mut receiver) = stream.split();

    let mut outbound_task = tokio::spawn(async move {
        while let Some(event) = inbox.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!(%conn, "failed to encode {event:?}: {e}");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let inbound_relay = relay.clone();
    let mut inbound_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            let text = match msg {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };

            let Ok(event) = serde_json::from_str::<ClientEvent>(text.as_str()) else {
                debug!(%conn, "ignoring malformed frame");
                continue;
            };

            inbound_relay.send(conn, event);
        }
    });

    tokio::select! {
        _ = &mut outbound_task => inbound_task.abort(),
        _ = &mut inbound_task => outbound_task.abort(),
    };

    relay.disconnect(conn);
}
