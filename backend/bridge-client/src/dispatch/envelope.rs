use crate::error::link::LinkError;

use common::ErrorLocation;

use std::panic::Location;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{"topic": ..., "data": ...}` structure wrapping every frame, in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub topic: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(topic: impl Into<String>, data: Value) -> Self {
        Self {
            topic: topic.into(),
            data,
        }
    }

    /// Serialize to a single-line JSON text frame.
    pub fn to_frame(&self) -> Result<String, LinkError> {
        serde_json::to_string(self).map_err(|e| LinkError::Serialization {
            message: format!("Failed to encode envelope for {}: {e}", self.topic),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Parse one inbound text frame.
///
/// Only structure is checked: the frame must be a JSON object with a string
/// `topic`. `data` is kept as an opaque value (`null` when absent).
///
/// # Errors
///
/// Returns [`LinkError::Decode`] for invalid JSON or a missing/non-string topic.
pub fn decode_frame(text: &str) -> Result<Envelope, LinkError> {
    serde_json::from_str::<Envelope>(text).map_err(|e| LinkError::Decode {
        message: format!("Malformed frame: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}
