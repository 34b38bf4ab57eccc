use crate::dispatch::{CleaningStatus, Envelope, Telemetry, TopicRouter, decode_frame};

use serde_json::json;

fn apply_frame(router: &TopicRouter, telemetry: &mut Telemetry, frame: &str) -> bool {
    let envelope = decode_frame(frame).expect("Test frame should decode");
    router.apply(telemetry, &envelope)
}

#[test]
fn given_new_telemetry_when_created_then_every_field_unknown() {
    let telemetry = Telemetry::default();

    assert_eq!(telemetry.battery_level, None);
    assert_eq!(telemetry.water_level, None);
    assert_eq!(telemetry.dust_level, None);
    assert_eq!(telemetry.room, None);
    assert_eq!(telemetry.cleaning_status, None);
    assert_eq!(telemetry.progress, None);
    assert_eq!(telemetry.cleaned_area, None);
    assert_eq!(telemetry.total_area, None);
}

/// **VALUE**: Verifies `/battery` updates only the battery level.
#[test]
fn given_battery_frame_when_applied_then_battery_level_set() {
    // GIVEN: Default routing and empty telemetry
    let router = TopicRouter::default();
    let mut telemetry = Telemetry::default();

    // WHEN: A battery frame arrives
    let changed = apply_frame(
        &router,
        &mut telemetry,
        r#"{"topic":"/battery","data":{"level":55}}"#,
    );

    // THEN: Battery is 55, nothing else touched
    assert!(changed);
    assert_eq!(telemetry.battery_level, Some(55.0));
    assert_eq!(
        telemetry,
        Telemetry {
            battery_level: Some(55.0),
            ..Telemetry::default()
        }
    );
}

/// **VALUE**: Verifies `/odom` sets room and progress and defaults absent areas to 0.
///
/// **WHY THIS MATTERS**: The bridge omits fields it has no value for yet. The dashboard
/// must show 0 rather than keep a stale area from a previous run.
#[test]
fn given_partial_odom_frame_when_applied_then_missing_areas_default_to_zero() {
    // GIVEN: Telemetry holding stale areas
    let router = TopicRouter::default();
    let mut telemetry = Telemetry {
        total_area: Some(80.0),
        cleaned_area: Some(60.0),
        ..Telemetry::default()
    };

    // WHEN: An odom frame without areas arrives
    apply_frame(
        &router,
        &mut telemetry,
        r#"{"topic":"/odom","data":{"room":"kitchen","progress":42}}"#,
    );

    // THEN: Room and progress set, areas reset to 0
    assert_eq!(telemetry.room.as_deref(), Some("kitchen"));
    assert_eq!(telemetry.progress, Some(42.0));
    assert_eq!(telemetry.cleaned_area, Some(0.0));
    assert_eq!(telemetry.total_area, Some(0.0));
}

#[test]
fn given_odom_without_room_when_applied_then_room_unknown() {
    let router = TopicRouter::default();
    let mut telemetry = Telemetry::default();

    apply_frame(
        &router,
        &mut telemetry,
        r#"{"topic":"/odom","data":{"room":"","total":35.5,"cleaned":12}}"#,
    );

    assert_eq!(telemetry.room.as_deref(), Some("Unknown"));
    assert_eq!(telemetry.progress, Some(0.0));
    assert_eq!(telemetry.total_area, Some(35.5));
    assert_eq!(telemetry.cleaned_area, Some(12.0));
}

#[test]
fn given_status_frame_when_applied_then_status_parsed() {
    let router = TopicRouter::default();
    let mut telemetry = Telemetry::default();

    apply_frame(
        &router,
        &mut telemetry,
        r#"{"topic":"/status","data":{"state":"Cleaning"}}"#,
    );
    assert_eq!(telemetry.cleaning_status, Some(CleaningStatus::Cleaning));

    apply_frame(
        &router,
        &mut telemetry,
        r#"{"topic":"/status","data":{"state":"returning_to_dock"}}"#,
    );
    assert_eq!(
        telemetry.cleaning_status,
        Some(CleaningStatus::Other("returning_to_dock".to_string()))
    );
}

#[test]
fn given_water_and_dust_frames_when_applied_then_levels_set() {
    let router = TopicRouter::default();
    let mut telemetry = Telemetry::default();

    apply_frame(&router, &mut telemetry, r#"{"topic":"/water_level","data":{"level":70}}"#);
    apply_frame(&router, &mut telemetry, r#"{"topic":"/dust_level","data":{"level":15}}"#);

    assert_eq!(telemetry.water_level, Some(70.0));
    assert_eq!(telemetry.dust_level, Some(15.0));
}

/// **VALUE**: Verifies unknown topics and wrongly-shaped payloads leave telemetry untouched.
///
/// **BUG THIS CATCHES**: Would catch a rule that wipes a field to `None`/0 when the bridge
/// sends a payload it doesn't understand.
#[test]
fn given_unknown_topic_or_bad_payload_when_applied_then_no_mutation() {
    // GIVEN: Telemetry with a known battery level
    let router = TopicRouter::default();
    let mut telemetry = Telemetry {
        battery_level: Some(80.0),
        ..Telemetry::default()
    };
    let before = telemetry.clone();

    // WHEN: Frames that should be ignored arrive
    let frames = [
        r#"{"topic":"/lidar","data":{"ranges":[1,2,3]}}"#,
        r#"{"topic":"/battery","data":{"level":"full"}}"#,
        r#"{"topic":"/battery","data":null}"#,
        r#"{"topic":"/status","data":{"mode":"auto"}}"#,
        r#"{"topic":"/odom","data":"kitchen"}"#,
    ];
    for frame in frames {
        assert!(!apply_frame(&router, &mut telemetry, frame), "{frame} should be ignored");
    }

    // THEN: Nothing changed
    assert_eq!(telemetry, before);
}

/// **VALUE**: Verifies a new topic is supported by registering a rule, with no other change.
#[test]
fn given_registered_rule_when_topic_arrives_then_rule_applied() {
    // GIVEN: A router extended with a custom topic
    let mut router = TopicRouter::default();
    router.register("/bin_full", |telemetry, data| {
        if data.get("full").and_then(|v| v.as_bool()) == Some(true) {
            telemetry.dust_level = Some(100.0);
            return true;
        }
        false
    });
    let mut telemetry = Telemetry::default();

    // WHEN: The custom topic arrives
    let changed = router.apply(
        &mut telemetry,
        &Envelope::new("/bin_full", json!({ "full": true })),
    );

    // THEN: The custom rule ran, defaults still registered
    assert!(changed);
    assert_eq!(telemetry.dust_level, Some(100.0));
    assert!(router.handles("/battery"));
    assert!(!TopicRouter::empty().handles("/battery"));
}

#[test]
fn given_partial_telemetry_when_displayed_then_unknown_fields_dashed() {
    let telemetry = Telemetry {
        battery_level: Some(55.0),
        cleaning_status: Some(CleaningStatus::Docked),
        ..Telemetry::default()
    };

    let rendered = telemetry.to_string();

    assert!(rendered.contains("battery 55%"), "{rendered}");
    assert!(rendered.contains("water --"), "{rendered}");
    assert!(rendered.contains("status docked"), "{rendered}");
}
