//! Test utilities and common setup.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use axum::Router;
use futures_util::{SinkExt, StreamExt};
use roomrelay::{app, rooms::ServerEvent, AppState, Config};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Create a test application backed by a fresh in-memory store and relay.
pub fn test_app() -> Router {
    let cors = Config::default().cors_layer().unwrap();
    app(AppState::in_memory(), cors)
}

/// Serve a fresh application on an ephemeral local port.
pub async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, test_app()).await.unwrap();
    });

    addr
}

pub async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    client
}

pub async fn emit(client: &mut Client, frame: Value) {
    client.send(Message::Text(frame.to_string().into())).await.unwrap();
}

/// Next relay event, failing the test if none arrives within a second.
pub async fn next_event(client: &mut Client) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(1), client.next())
            .await
            .expect("timed out waiting for an event")
            .expect("socket closed")
            .unwrap();

        if let Message::Text(_) = msg {
            return serde_json::from_str(msg.to_text().unwrap()).unwrap();
        }
    }
}

/// Asserts nothing arrives for a short while.
pub async fn assert_silent(client: &mut Client) {
    let waited = tokio::time::timeout(Duration::from_millis(150), client.next()).await;
    assert!(waited.is_err(), "expected no event, got {waited:?}");
}
