use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures of the bridge link.
///
/// Only [`LinkError::InvalidArgument`] is ever returned to a caller of
/// [`ConnectionManager::connect`](crate::ConnectionManager::connect). Transport
/// failures are recovered by the reconnect policy and surface as state changes;
/// decode failures and rejected sends are logged at the point they happen.
#[derive(Debug, ThisError)]
pub enum LinkError {
    #[error("Invalid Argument Error: {message} {location}")]
    InvalidArgument {
        message: String,
        location: ErrorLocation,
    },

    #[error("Transport Open Error: {message} {location}")]
    TransportOpen {
        message: String,
        location: ErrorLocation,
    },

    #[error("Transport Closed Error: {message} {location}")]
    TransportClosed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Rejected Error: {message} {location}")]
    SendRejected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Serialization Error: {message} {location}")]
    Serialization {
        message: String,
        location: ErrorLocation,
    },

    #[error("Actor Error: {message} {location}")]
    Actor {
        message: String,
        location: ErrorLocation,
    },
}

impl LinkError {
    #[track_caller]
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        LinkError::InvalidArgument {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for LinkError {
    #[track_caller]
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        LinkError::TransportOpen {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
