//! Connection Manager.
//!
//! Owns the single WebSocket link to the robot bridge, keeps exactly one
//! logical connection across reconnect attempts, and recovers from transport
//! failure on a fixed delay until the operator disconnects.
//!
//! # Architecture
//!
//! - [`ConnectionManager`]: the caller's owned handle (connect, send, disconnect)
//! - a link actor task: the one execution context that owns the live transport,
//!   the reconnect deadline and the state machine
//! - `machine`: pure state machine; every input returns the actions to perform
//! - `transport`: one task per opened socket, forwarding events to the actor
//!
//! All transitions happen on the actor, one at a time, so nothing here needs
//! more than the channel boundaries for synchronisation.

mod endpoint;
mod handler;
mod machine;
mod manager;
mod state;
mod transport;

pub use endpoint::resolve_url;
pub(crate) use endpoint::check_websocket_url;
pub use handler::{LinkEvent, LinkHandler};
pub use manager::ConnectionManager;
pub use state::LinkState;

pub(crate) use machine::{Action, ConnectionMachine, TransportFailure};
