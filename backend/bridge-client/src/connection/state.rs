use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Lifecycle state of the bridge link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LinkState {
    /// Initial state, and the terminal state after a manual disconnect.
    Disconnected,
    Connecting,
    Connected,
    /// A transport failed and exactly one reconnect is scheduled.
    Reconnecting,
}

impl LinkState {
    /// States in which a transport exists (opening or open).
    pub fn has_transport(self) -> bool {
        matches!(self, LinkState::Connecting | LinkState::Connected)
    }
}

impl Display for LinkState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Reconnecting => "reconnecting",
        };
        f.write_str(name)
    }
}
