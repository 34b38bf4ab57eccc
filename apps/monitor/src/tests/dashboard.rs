use crate::dashboard::Dashboard;

use bridge_client::{Envelope, LinkEvent, TopicRouter};

use serde_json::json;

/// **VALUE**: Verifies connectivity and telemetry are both tracked from the event stream.
#[test]
fn given_event_stream_when_handled_then_snapshot_and_connectivity_tracked() {
    // GIVEN: A fresh dashboard
    let mut dashboard = Dashboard::default();
    assert!(!dashboard.is_connected());

    // WHEN: Connected, then a battery reading, then a drop
    assert!(dashboard.handle(LinkEvent::StateChanged(true)));
    assert!(dashboard.handle(LinkEvent::Message(Envelope::new(
        "/battery",
        json!({ "level": 80 })
    ))));
    assert!(dashboard.handle(LinkEvent::StateChanged(false)));

    // THEN: The reading survives the drop
    assert!(!dashboard.is_connected());
    assert_eq!(dashboard.telemetry().battery_level, Some(80.0));
}

#[test]
fn given_repeated_state_when_handled_then_reports_no_change() {
    let mut dashboard = Dashboard::default();

    assert!(!dashboard.handle(LinkEvent::StateChanged(false)));
    assert!(dashboard.handle(LinkEvent::StateChanged(true)));
    assert!(!dashboard.handle(LinkEvent::StateChanged(true)));
}

#[test]
fn given_router_without_rules_when_message_handled_then_ignored() {
    let mut dashboard = Dashboard::new(TopicRouter::empty());

    let changed = dashboard.handle(LinkEvent::Message(Envelope::new(
        "/battery",
        json!({ "level": 80 }),
    )));

    assert!(!changed);
    assert_eq!(dashboard.telemetry().battery_level, None);
}
