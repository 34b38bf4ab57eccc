pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;

#[cfg(test)]
mod tests;

pub use config::BridgeConfig;
pub use connection::{ConnectionManager, LinkEvent, LinkHandler, LinkState};
pub use dispatch::{
    CleanAction, CleaningMode, CleaningStatus, DriveDirection, Envelope, RobotCommand,
    SuctionLevel, Telemetry, TopicRouter,
};

/// Insecure WebSocket scheme prefix, rewritten when the hosting context is secure.
pub const INSECURE_SCHEME_PREFIX: &str = "ws://";
/// Secure WebSocket scheme prefix.
pub const SECURE_SCHEME_PREFIX: &str = "wss://";
