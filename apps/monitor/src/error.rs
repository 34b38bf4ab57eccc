use bridge_client::error::{ConfigError, CoreError, LinkError};

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors that stop the monitor process.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Error from this app (logging, directories, console input)
    #[error("Monitor Error: {message} {location}")]
    Monitor {
        message: String,
        location: ErrorLocation,
    },

    /// Error from bridge-client operations (config, connect)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// No bridge URL was configured
    #[error("No Url Error: {message} {location}")]
    NoUrl {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for MonitorError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        MonitorError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for MonitorError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        MonitorError::from(CoreError::from(error))
    }
}

impl From<LinkError> for MonitorError {
    #[track_caller]
    fn from(error: LinkError) -> Self {
        MonitorError::from(CoreError::from(error))
    }
}
