use crate::link_tests::helpers::{TestBridge, next_event, receive_json, send_text, test_config};

use bridge_client::{
    CleanAction, CleaningStatus, ConnectionManager, DriveDirection, LinkEvent, RobotCommand,
    Telemetry, TopicRouter,
};

use serde_json::json;
use tokio::sync::mpsc;

/// **VALUE**: Verifies telemetry frames from a live bridge fold into `Telemetry` via the router.
#[tokio::test]
async fn given_live_bridge_when_telemetry_streams_then_snapshot_updated() {
    // GIVEN: A connected manager and a default router
    let mut bridge = TestBridge::start().await;
    let manager = ConnectionManager::new(&test_config());
    let (events_tx, mut events) = mpsc::unbounded_channel();
    manager.connect(&bridge.url, events_tx).expect("Connect should be accepted");
    let mut socket = bridge.accept().await;
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(true));
    let router = TopicRouter::default();
    let mut telemetry = Telemetry::default();

    // WHEN: The bridge streams a mix of known and unknown topics
    let frames = [
        r#"{"topic":"/battery","data":{"level":55}}"#,
        r#"{"topic":"/status","data":{"state":"Cleaning"}}"#,
        r#"{"topic":"/lidar","data":{"ranges":[]}}"#,
        r#"{"topic":"/odom","data":{"room":"kitchen","progress":42}}"#,
    ];
    for frame in frames {
        send_text(&mut socket, frame).await;
    }
    for _ in 0..frames.len() {
        if let LinkEvent::Message(envelope) = next_event(&mut events).await {
            router.apply(&mut telemetry, &envelope);
        }
    }

    // THEN: Known topics landed, the unknown one changed nothing
    assert_eq!(telemetry.battery_level, Some(55.0));
    assert_eq!(telemetry.cleaning_status, Some(CleaningStatus::Cleaning));
    assert_eq!(telemetry.room.as_deref(), Some("kitchen"));
    assert_eq!(telemetry.progress, Some(42.0));
    assert_eq!(telemetry.total_area, Some(0.0));
}

/// **VALUE**: Verifies typed commands reach the bridge with the expected topic and payload.
#[tokio::test]
async fn given_live_bridge_when_commands_sent_then_bridge_receives_wire_format() {
    // GIVEN: A connected manager
    let mut bridge = TestBridge::start().await;
    let manager = ConnectionManager::new(&test_config());
    let (events_tx, mut events) = mpsc::unbounded_channel();
    manager.connect(&bridge.url, events_tx).expect("Connect should be accepted");
    let mut socket = bridge.accept().await;
    assert_eq!(next_event(&mut events).await, LinkEvent::StateChanged(true));

    // WHEN: Sending a clean command and a drive command
    assert!(manager.send_command(&RobotCommand::CleanControl(CleanAction::Start)));
    assert!(manager.send_command(&RobotCommand::Drive(DriveDirection::Left)));

    // THEN: Both arrive in order
    assert_eq!(
        receive_json(&mut socket).await,
        json!({ "topic": "/clean_control", "data": { "action": "start" } })
    );
    assert_eq!(
        receive_json(&mut socket).await,
        json!({
            "topic": "/cmd_vel",
            "data": { "linear": { "x": 0.0 }, "angular": { "z": 0.5 } }
        })
    );
}
