use super::envelope::Envelope;
use super::{TOPIC_BATTERY, TOPIC_DUST_LEVEL, TOPIC_ODOM, TOPIC_STATUS, TOPIC_WATER_LEVEL};

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use log::debug;
use serde::Serialize;
use serde_json::Value;

const UNKNOWN_ROOM: &str = "Unknown";
const UNREPORTED: &str = "--";

/// Robot cleaning status as reported on `/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CleaningStatus {
    Idle,
    Cleaning,
    Paused,
    Docked,
    Charging,
    Error,
    /// Any state string the bridge sends that has no dedicated variant.
    Other(String),
}

impl CleaningStatus {
    /// Case-insensitive; unrecognised states are kept verbatim in [`CleaningStatus::Other`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "idle" => CleaningStatus::Idle,
            "cleaning" => CleaningStatus::Cleaning,
            "paused" => CleaningStatus::Paused,
            "docked" => CleaningStatus::Docked,
            "charging" => CleaningStatus::Charging,
            "error" => CleaningStatus::Error,
            _ => CleaningStatus::Other(raw.to_string()),
        }
    }
}

impl Display for CleaningStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CleaningStatus::Idle => f.write_str("idle"),
            CleaningStatus::Cleaning => f.write_str("cleaning"),
            CleaningStatus::Paused => f.write_str("paused"),
            CleaningStatus::Docked => f.write_str("docked"),
            CleaningStatus::Charging => f.write_str("charging"),
            CleaningStatus::Error => f.write_str("error"),
            CleaningStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// Caller-owned telemetry snapshot.
///
/// `None` means the robot has not reported that field yet. Each field only
/// changes when its topic arrives.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Telemetry {
    pub battery_level: Option<f64>,
    pub water_level: Option<f64>,
    pub dust_level: Option<f64>,
    pub room: Option<String>,
    pub cleaning_status: Option<CleaningStatus>,
    pub progress: Option<f64>,
    pub cleaned_area: Option<f64>,
    pub total_area: Option<f64>,
}

impl Display for Telemetry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "battery {} | water {} | dust {} | status {} | room {} | progress {} | area {}/{}",
            percent(self.battery_level),
            percent(self.water_level),
            percent(self.dust_level),
            self.cleaning_status
                .as_ref()
                .map_or_else(|| UNREPORTED.to_string(), ToString::to_string),
            self.room.as_deref().unwrap_or(UNREPORTED),
            percent(self.progress),
            plain(self.cleaned_area),
            plain(self.total_area),
        )
    }
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| UNREPORTED.to_string(), |v| format!("{v}%"))
}

fn plain(value: Option<f64>) -> String {
    value.map_or_else(|| UNREPORTED.to_string(), |v| v.to_string())
}

/// Update rule for one topic. Returns `true` when the telemetry changed.
pub type RoutingRule = Box<dyn Fn(&mut Telemetry, &Value) -> bool + Send + Sync>;

/// Topic → update-rule table.
pub struct TopicRouter {
    rules: HashMap<String, RoutingRule>,
}

impl TopicRouter {
    /// A router with no rules at all.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Add a rule, replacing any rule already registered for `topic`.
    pub fn register<F>(&mut self, topic: impl Into<String>, rule: F) -> &mut Self
    where
        F: Fn(&mut Telemetry, &Value) -> bool + Send + Sync + 'static,
    {
        self.rules.insert(topic.into(), Box::new(rule));
        self
    }

    pub fn handles(&self, topic: &str) -> bool {
        self.rules.contains_key(topic)
    }

    /// Apply `envelope` to `telemetry`. Unknown topics are ignored.
    pub fn apply(&self, telemetry: &mut Telemetry, envelope: &Envelope) -> bool {
        match self.rules.get(envelope.topic.as_str()) {
            Some(rule) => rule(telemetry, &envelope.data),
            None => {
                debug!("Ignoring unrouted topic {}", envelope.topic);
                false
            }
        }
    }
}

impl Default for TopicRouter {
    fn default() -> Self {
        let mut router = Self::empty();
        router
            .register(TOPIC_BATTERY, |t, data| {
                set_number(&mut t.battery_level, data, "level")
            })
            .register(TOPIC_WATER_LEVEL, |t, data| {
                set_number(&mut t.water_level, data, "level")
            })
            .register(TOPIC_DUST_LEVEL, |t, data| {
                set_number(&mut t.dust_level, data, "level")
            })
            .register(TOPIC_STATUS, apply_status)
            .register(TOPIC_ODOM, apply_odom);
        router
    }
}

fn set_number(field: &mut Option<f64>, data: &Value, key: &str) -> bool {
    match data.get(key).and_then(Value::as_f64) {
        Some(value) => {
            *field = Some(value);
            true
        }
        None => false,
    }
}

fn apply_status(telemetry: &mut Telemetry, data: &Value) -> bool {
    match data.get("state").and_then(Value::as_str) {
        Some(state) => {
            telemetry.cleaning_status = Some(CleaningStatus::parse(state));
            true
        }
        None => false,
    }
}

// Absent, null, zero or empty values fall back to the defaults ("Unknown" / 0).
fn apply_odom(telemetry: &mut Telemetry, data: &Value) -> bool {
    if !data.is_object() {
        return false;
    }

    let room = data
        .get("room")
        .and_then(Value::as_str)
        .filter(|room| !room.is_empty())
        .unwrap_or(UNKNOWN_ROOM);
    let number_or_zero = |key: &str| data.get(key).and_then(Value::as_f64).unwrap_or(0.0);

    telemetry.room = Some(room.to_string());
    telemetry.progress = Some(number_or_zero("progress"));
    telemetry.total_area = Some(number_or_zero("total"));
    telemetry.cleaned_area = Some(number_or_zero("cleaned"));
    true
}
