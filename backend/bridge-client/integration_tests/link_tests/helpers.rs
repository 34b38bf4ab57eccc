//! Test helpers for bridge link integration tests.
//!
//! This module provides a throwaway WebSocket bridge on a random local port:
//! - Accepting client connections one at a time
//! - Sending/receiving JSON text frames
//! - Waiting on link events and state with a timeout

use bridge_client::{BridgeConfig, LinkEvent, LinkState};

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

/// Reconnect delay used by tests so recovery happens quickly.
pub const TEST_RECONNECT_DELAY_MS: u64 = 100;

pub type BridgeSocket = WebSocketStream<TcpStream>;

/// Config with a short reconnect delay.
pub fn test_config() -> BridgeConfig {
    BridgeConfig {
        reconnect_delay_ms: TEST_RECONNECT_DELAY_MS,
        ..BridgeConfig::default()
    }
}

/// A local WebSocket server standing in for the robot bridge.
pub struct TestBridge {
    pub url: String,
    sockets: mpsc::UnboundedReceiver<BridgeSocket>,
}

impl TestBridge {
    /// Test helper: Bind to `127.0.0.1:0` and accept connections in the background.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test bridge");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let (sockets_tx, sockets) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let Ok(ws) = accept_async(stream).await else {
                    continue;
                };
                if sockets_tx.send(ws).is_err() {
                    break;
                }
            }
        });

        Self {
            url: format!("ws://{addr}"),
            sockets,
        }
    }

    /// Test helper: Wait for the next client connection.
    pub async fn accept(&mut self) -> BridgeSocket {
        timeout(WAIT, self.sockets.recv())
            .await
            .expect("Timed out waiting for a client connection")
            .expect("Test bridge stopped accepting")
    }

    /// Test helper: Assert that no client connects within `window`.
    pub async fn assert_no_connection(&mut self, window: Duration) {
        let result = timeout(window, self.sockets.recv()).await;
        assert!(
            result.is_err(),
            "No client should have connected within {window:?}"
        );
    }
}

/// Test helper: Send one text frame from the bridge side.
pub async fn send_text(socket: &mut BridgeSocket, frame: &str) {
    socket
        .send(Message::Text(frame.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Test helper: Receive the next text frame on the bridge side and parse it as JSON.
pub async fn receive_json(socket: &mut BridgeSocket) -> Value {
    loop {
        let message = timeout(WAIT, socket.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Socket closed before a frame arrived")
            .expect("Error receiving frame");

        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).expect("Frame should be JSON");
        }
    }
}

/// Test helper: Check whether the client side has closed the socket.
pub async fn is_connection_closed(socket: &mut BridgeSocket) -> bool {
    loop {
        match timeout(WAIT, socket.next()).await {
            Ok(None) | Ok(Some(Err(_))) | Ok(Some(Ok(Message::Close(_)))) => return true,
            Ok(Some(Ok(_))) => continue,
            Err(_) => return false,
        }
    }
}

/// Test helper: Wait for the next link event.
pub async fn next_event(events: &mut mpsc::UnboundedReceiver<LinkEvent>) -> LinkEvent {
    timeout(WAIT, events.recv())
        .await
        .expect("Timed out waiting for a link event")
        .expect("Link event channel closed")
}

/// Test helper: Assert that no link event arrives within `window`.
pub async fn assert_no_event(events: &mut mpsc::UnboundedReceiver<LinkEvent>, window: Duration) {
    if let Ok(Some(event)) = timeout(window, events.recv()).await {
        panic!("Expected no link event, got {event:?}");
    }
}

/// Test helper: Wait until the manager reports `expected`.
pub async fn wait_for_state(state: &mut watch::Receiver<LinkState>, expected: LinkState) {
    timeout(WAIT, state.wait_for(|current| *current == expected))
        .await
        .unwrap_or_else(|_| panic!("Timed out waiting for state {expected}"))
        .expect("State channel closed");
}

/// Test helper: A local address nothing listens on.
pub async fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);
    format!("ws://{addr}")
}
