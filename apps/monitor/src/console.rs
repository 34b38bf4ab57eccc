//! Operator commands read line by line from stdin.
//!
//! ```text
//! start | pause | stop | resume
//! mode <auto|spot|edge|mopping|dock|manual>
//! suction <low|medium|turbo>
//! drive <forward|backward|left|right|stop>
//! ```

use crate::error::MonitorError;

use bridge_client::{
    CleanAction, CleaningMode, ConnectionManager, DriveDirection, RobotCommand, SuctionLevel,
};

use common::ErrorLocation;

use std::panic::Location;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse one console line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`MonitorError::Monitor`] for an unknown verb or argument.
pub fn parse_command(line: &str) -> Result<Option<RobotCommand>, MonitorError> {
    let words: Vec<String> = line
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect();

    let command = match words.as_slice() {
        [] => return Ok(None),
        [verb] => RobotCommand::CleanControl(parse_word::<CleanAction>(verb, line)?),
        [verb, argument] => match verb.as_str() {
            "mode" => RobotCommand::SetMode(parse_word::<CleaningMode>(argument, line)?),
            "suction" => RobotCommand::SetSuction(parse_word::<SuctionLevel>(argument, line)?),
            "drive" => RobotCommand::Drive(parse_word::<DriveDirection>(argument, line)?),
            _ => return Err(unknown_command(line)),
        },
        _ => return Err(unknown_command(line)),
    };

    Ok(Some(command))
}

/// Send `command` and log the operator feedback.
///
/// Returns the same result as [`ConnectionManager::send_command`].
pub fn issue(manager: &ConnectionManager, command: &RobotCommand) -> bool {
    if !manager.send_command(command) {
        warn!("{} not sent, bridge is not connected", command.topic());
        return false;
    }

    if let RobotCommand::CleanControl(action) = command {
        info!("{}", action.announcement());
    } else {
        info!("Sent {}", command.topic());
    }
    true
}

// Command enums deserialize from their lowercase wire names.
fn parse_word<T: DeserializeOwned>(word: &str, line: &str) -> Result<T, MonitorError> {
    serde_json::from_value(Value::String(word.to_string())).map_err(|_| unknown_command(line))
}

#[track_caller]
fn unknown_command(line: &str) -> MonitorError {
    MonitorError::Monitor {
        message: format!("Unknown command '{}'", line.trim()),
        location: ErrorLocation::from(Location::caller()),
    }
}
