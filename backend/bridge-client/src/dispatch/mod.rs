//! Message Dispatcher.
//!
//! Turns raw inbound text frames into [`Envelope`]s, routes envelopes by topic
//! onto caller-owned [`Telemetry`], and builds outbound command envelopes.
//!
//! The routing table is open-ended: supporting a new topic means registering a
//! rule on a [`TopicRouter`], never touching the decode or send path.

mod command;
mod envelope;
mod telemetry;

pub use command::{CleanAction, CleaningMode, DriveDirection, RobotCommand, SuctionLevel};
pub use envelope::{Envelope, decode_frame};
pub use telemetry::{CleaningStatus, RoutingRule, Telemetry, TopicRouter};

/// Battery telemetry topic (`data.level`).
pub const TOPIC_BATTERY: &str = "/battery";
/// Cleaning status topic (`data.state`).
pub const TOPIC_STATUS: &str = "/status";
/// Odometry/progress topic (`data.room`, `data.progress`, `data.total`, `data.cleaned`).
pub const TOPIC_ODOM: &str = "/odom";
/// Clean-water tank level topic (`data.level`).
pub const TOPIC_WATER_LEVEL: &str = "/water_level";
/// Dust bin level topic (`data.level`).
pub const TOPIC_DUST_LEVEL: &str = "/dust_level";

pub const TOPIC_CLEAN_CONTROL: &str = "/clean_control";
pub const TOPIC_SET_MODE: &str = "/set_mode";
pub const TOPIC_SET_SUCTION: &str = "/set_suction";
pub const TOPIC_CMD_VEL: &str = "/cmd_vel";
