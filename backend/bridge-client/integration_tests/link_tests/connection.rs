use crate::link_tests::helpers::{
    TEST_RECONNECT_DELAY_MS, TestBridge, WAIT, assert_no_event, is_connection_closed,
    next_event, receive_json, send_text, test_config, unused_url, wait_for_state,
};

use bridge_client::error::LinkError;
use bridge_client::{ConnectionManager, Envelope, LinkEvent, LinkState};

use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

/// **VALUE**: Verifies the full happy path: open, receive one telemetry frame, send one command.
///
/// **WHY THIS MATTERS**: This is the whole job of the link. The caller must hear
/// `connected = true`, get decoded envelopes, and its sends must arrive as a single
/// `{"topic", "data"}` frame.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The outbound writer is not published when the transport opens
/// - Inbound frames are not decoded or not delivered to the handler
/// - The outbound frame shape drifts from what the bridge expects
#[tokio::test]
async fn given_bridge_when_connected_then_frames_flow_both_ways() {
    // GIVEN: A bridge and a manager
    let mut bridge = TestBridge::start().await;
    let manager = ConnectionManager::new(&test_config());
    let (events_tx, mut events) = mpsc::unbounded_channel();

    // WHEN: Connecting
    manager
        .connect(&bridge.url, events_tx)
        .expect("Connect should be accepted");
    let mut socket = bridge.accept().await;

    // THEN: Caller hears connected
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(true));
    assert!(manager.is_connected());

    // WHEN: The bridge sends battery telemetry
    send_text(&mut socket, r#"{"topic":"/battery","data":{"level":55}}"#).await;

    // THEN: Caller receives the decoded envelope
    assert_eq!(
        next_event(&mut events).await,
        LinkEvent::Message(Envelope::new("/battery", json!({ "level": 55 })))
    );

    // WHEN: Caller sends a command
    let sent = manager.send("/set_mode", json!({ "mode": "spot" }));

    // THEN: The bridge receives exactly that envelope
    assert!(sent, "Send should succeed while connected");
    assert_eq!(
        receive_json(&mut socket).await,
        json!({ "topic": "/set_mode", "data": { "mode": "spot" } })
    );
}

/// **VALUE**: Verifies `send` refuses without blocking or throwing when nothing is open.
#[tokio::test]
async fn given_no_connection_when_send_then_returns_false() {
    // GIVEN: A manager that never connected
    let manager = ConnectionManager::new(&test_config());

    // WHEN: Sending
    let sent = manager.send("/clean_control", json!({ "action": "start" }));

    // THEN: Refused
    assert!(!sent);
    assert_eq!(manager.state(), LinkState::Disconnected);
}

/// **VALUE**: Verifies a malformed frame is dropped and the link stays up.
///
/// **BUG THIS CATCHES**: Would catch if a decode error tore down the transport or
/// killed the link actor, so one bad frame from the bridge meant a reconnect cycle.
#[tokio::test]
async fn given_connected_when_malformed_frame_then_ignored_and_link_stays_up() {
    // GIVEN: A connected manager
    let mut bridge = TestBridge::start().await;
    let manager = ConnectionManager::new(&test_config());
    let (events_tx, mut events) = mpsc::unbounded_channel();
    manager.connect(&bridge.url, events_tx).expect("Connect should be accepted");
    let mut socket = bridge.accept().await;
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(true));

    // WHEN: Garbage, then a valid frame
    send_text(&mut socket, "not json at all").await;
    send_text(&mut socket, r#"{"data":{"level":10}}"#).await;
    send_text(&mut socket, r#"{"topic":"/status","data":{"state":"cleaning"}}"#).await;

    // THEN: Only the valid frame is delivered, and the link is still connected
    assert_eq!(
        next_event(&mut events).await,
        LinkEvent::Message(Envelope::new("/status", json!({ "state": "cleaning" })))
    );
    assert_eq!(manager.state(), LinkState::Connected);
}

/// **VALUE**: Verifies an unexpected close notifies `false` and reconnects to the same URL.
///
/// **WHY THIS MATTERS**: The robot bridge restarts and Wi-Fi roams. The dashboard must
/// come back on its own after the fixed delay, with the same handler.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Peer close is not treated as a failure
/// - The reconnect timer is never armed, or armed more than once
/// - The handler is lost across reconnects
#[tokio::test]
async fn given_connected_when_bridge_closes_then_reconnects_after_delay() {
    // GIVEN: A connected manager
    let mut bridge = TestBridge::start().await;
    let manager = ConnectionManager::new(&test_config());
    let mut state = manager.state_receiver();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    manager.connect(&bridge.url, events_tx).expect("Connect should be accepted");
    let mut socket = bridge.accept().await;
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(true));

    // WHEN: The bridge closes the socket
    socket.close(None).await.expect("Failed to close from bridge");

    // THEN: Caller hears disconnected, then the link comes back
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(false));
    let mut second = bridge.accept().await;
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(true));
    wait_for_state(&mut state, LinkState::Connected).await;

    // AND: Exactly one reconnect happened
    bridge
        .assert_no_connection(Duration::from_millis(TEST_RECONNECT_DELAY_MS * 4))
        .await;

    // AND: The new transport carries traffic
    assert!(manager.send("/cmd_vel", json!({ "linear": { "x": 0.2 }, "angular": { "z": 0.0 } })));
    assert_eq!(receive_json(&mut second).await["topic"], json!("/cmd_vel"));
}

/// **VALUE**: Verifies an unreachable bridge is retried indefinitely on the fixed delay.
#[tokio::test]
async fn given_unreachable_bridge_when_connecting_then_keeps_retrying() {
    // GIVEN: A URL nothing listens on
    let url = unused_url().await;
    let manager = ConnectionManager::new(&test_config());
    let (events_tx, mut events) = mpsc::unbounded_channel();

    // WHEN: Connecting
    manager.connect(&url, events_tx).expect("Connect should be accepted");

    // THEN: Every attempt fails with `false`, and attempts keep coming
    for _ in 0..3 {
        assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(false));
    }

    manager.disconnect();
}

/// **VALUE**: Verifies `disconnect()` during the reconnect wait stops all further attempts.
///
/// **BUG THIS CATCHES**: Would catch a phantom reconnect where the timer armed before
/// `disconnect()` still fires and silently re-opens the link.
#[tokio::test]
async fn given_reconnect_pending_when_disconnect_then_no_further_attempts() {
    // GIVEN: A link that just lost its transport
    let mut bridge = TestBridge::start().await;
    let manager = ConnectionManager::new(&test_config());
    let mut state = manager.state_receiver();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    manager.connect(&bridge.url, events_tx).expect("Connect should be accepted");
    let mut socket = bridge.accept().await;
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(true));
    socket.close(None).await.expect("Failed to close from bridge");
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(false));

    // WHEN: Disconnecting while the reconnect is pending
    manager.disconnect();

    // THEN: Nothing reconnects and the caller hears nothing more
    wait_for_state(&mut state, LinkState::Disconnected).await;
    bridge
        .assert_no_connection(Duration::from_millis(TEST_RECONNECT_DELAY_MS * 5))
        .await;
    assert_no_event(&mut events, Duration::from_millis(TEST_RECONNECT_DELAY_MS * 2)).await;
    assert!(!manager.send("/clean_control", json!({ "action": "stop" })));
}

/// **VALUE**: Verifies `disconnect()` on a live link closes the socket with no notification.
#[tokio::test]
async fn given_connected_when_disconnect_then_socket_closed_without_notify() {
    // GIVEN: A connected manager
    let mut bridge = TestBridge::start().await;
    let manager = ConnectionManager::new(&test_config());
    let mut state = manager.state_receiver();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    manager.connect(&bridge.url, events_tx).expect("Connect should be accepted");
    let mut socket = bridge.accept().await;
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(true));

    // WHEN: Disconnecting
    manager.disconnect();

    // THEN: The bridge sees the close, the state is final, and no event is raised
    assert!(is_connection_closed(&mut socket).await, "Bridge should see the close");
    wait_for_state(&mut state, LinkState::Disconnected).await;
    bridge
        .assert_no_connection(Duration::from_millis(TEST_RECONNECT_DELAY_MS * 5))
        .await;
    assert_no_event(&mut events, Duration::from_millis(TEST_RECONNECT_DELAY_MS)).await;
}

/// **VALUE**: Verifies connecting to a new bridge replaces the old transport instead of adding one.
#[tokio::test]
async fn given_connected_when_connect_to_other_bridge_then_old_socket_closed() {
    // GIVEN: A manager connected to bridge A
    let mut bridge_a = TestBridge::start().await;
    let mut bridge_b = TestBridge::start().await;
    let manager = ConnectionManager::new(&test_config());
    let (events_tx, mut events) = mpsc::unbounded_channel();
    manager
        .connect(&bridge_a.url, events_tx.clone())
        .expect("Connect should be accepted");
    let mut socket_a = bridge_a.accept().await;
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(true));

    // WHEN: Connecting to bridge B
    manager
        .connect(&bridge_b.url, events_tx)
        .expect("Connect should be accepted");

    // THEN: A is closed, B is live, and A is never retried
    let mut socket_b = bridge_b.accept().await;
    assert!(is_connection_closed(&mut socket_a).await, "Old socket should be closed");
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(true));
    bridge_a
        .assert_no_connection(Duration::from_millis(TEST_RECONNECT_DELAY_MS * 4))
        .await;

    assert!(manager.send("/set_suction", json!({ "level": "low" })));
    assert_eq!(receive_json(&mut socket_b).await["topic"], json!("/set_suction"));
}

/// **VALUE**: Verifies an empty URL fails synchronously and no socket is attempted.
///
/// **WHY THIS MATTERS**: The operator pressing connect with an empty box must get a
/// prompt, not a background retry loop against nothing.
#[tokio::test]
async fn given_empty_url_when_connect_then_invalid_argument_and_no_attempt() {
    // GIVEN: A manager
    let manager = ConnectionManager::new(&test_config());
    let (events_tx, mut events) = mpsc::unbounded_channel();

    // WHEN: Connecting with an empty URL
    let result = manager.connect("", events_tx);

    // THEN: InvalidArgument with the operator prompt, state untouched
    let err = result.expect_err("Empty URL must be rejected");
    assert!(matches!(err, LinkError::InvalidArgument { .. }));
    assert!(err.to_string().contains("Please enter the bridge IP or URL first"));
    assert_no_event(&mut events, WAIT / 25).await;
    assert_eq!(manager.state(), LinkState::Disconnected);
}
