use super::envelope::Envelope;
use super::{TOPIC_CLEAN_CONTROL, TOPIC_CMD_VEL, TOPIC_SET_MODE, TOPIC_SET_SUCTION};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const DRIVE_LINEAR_SPEED: f64 = 0.2;
const DRIVE_ANGULAR_SPEED: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanAction {
    Start,
    Pause,
    Stop,
    Resume,
}

impl CleanAction {
    pub fn as_str(self) -> &'static str {
        match self {
            CleanAction::Start => "start",
            CleanAction::Pause => "pause",
            CleanAction::Stop => "stop",
            CleanAction::Resume => "resume",
        }
    }

    /// Operator feedback phrase for an accepted clean-control command.
    pub fn announcement(self) -> &'static str {
        match self {
            CleanAction::Start => "Starting cleaning process",
            CleanAction::Pause => "Pausing cleaning",
            CleanAction::Stop => "Stopping cleaning",
            CleanAction::Resume => "Resuming cleaning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleaningMode {
    Auto,
    Spot,
    Edge,
    Mopping,
    Dock,
    Manual,
}

impl CleaningMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CleaningMode::Auto => "auto",
            CleaningMode::Spot => "spot",
            CleaningMode::Edge => "edge",
            CleaningMode::Mopping => "mopping",
            CleaningMode::Dock => "dock",
            CleaningMode::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuctionLevel {
    Low,
    Medium,
    Turbo,
}

impl SuctionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SuctionLevel::Low => "low",
            SuctionLevel::Medium => "medium",
            SuctionLevel::Turbo => "turbo",
        }
    }
}

/// Manual-drive input. Forward/backward only move linearly, left/right only
/// rotate, stop zeroes both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveDirection {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

impl DriveDirection {
    /// `(linear.x, angular.z)` for this input.
    pub fn velocity(self) -> (f64, f64) {
        match self {
            DriveDirection::Forward => (DRIVE_LINEAR_SPEED, 0.0),
            DriveDirection::Backward => (-DRIVE_LINEAR_SPEED, 0.0),
            DriveDirection::Left => (0.0, DRIVE_ANGULAR_SPEED),
            DriveDirection::Right => (0.0, -DRIVE_ANGULAR_SPEED),
            DriveDirection::Stop => (0.0, 0.0),
        }
    }
}

/// Operator intents that map to outbound bridge topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotCommand {
    CleanControl(CleanAction),
    SetMode(CleaningMode),
    SetSuction(SuctionLevel),
    Drive(DriveDirection),
}

impl RobotCommand {
    pub fn topic(&self) -> &'static str {
        match self {
            RobotCommand::CleanControl(_) => TOPIC_CLEAN_CONTROL,
            RobotCommand::SetMode(_) => TOPIC_SET_MODE,
            RobotCommand::SetSuction(_) => TOPIC_SET_SUCTION,
            RobotCommand::Drive(_) => TOPIC_CMD_VEL,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            RobotCommand::CleanControl(action) => json!({ "action": action.as_str() }),
            RobotCommand::SetMode(mode) => json!({ "mode": mode.as_str() }),
            RobotCommand::SetSuction(level) => json!({ "level": level.as_str() }),
            RobotCommand::Drive(direction) => {
                let (linear, angular) = direction.velocity();
                json!({
                    "linear": { "x": linear },
                    "angular": { "z": angular },
                })
            }
        }
    }

    pub fn to_envelope(&self) -> Envelope {
        Envelope::new(self.topic(), self.payload())
    }
}
