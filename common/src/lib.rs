//! Shared building blocks for the cleaning-robot bridge workspace.
//!
//! ## Architecture
//!
//! - **common** (this crate): error plumbing shared by every crate
//! - **bridge-client**: connection manager, dispatcher and telemetry model
//! - **cleanbot-monitor**: headless application wiring everything together

pub mod error;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
