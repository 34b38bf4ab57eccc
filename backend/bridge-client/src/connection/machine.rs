//! Pure connection state machine.
//!
//! Every input returns the list of [`Action`]s the link actor must carry out,
//! so the transition rules can be exercised without sockets or timers.
//!
//! Each opened transport gets a fresh `generation`. Transport events carry the
//! generation they belong to; events from a replaced or manually closed
//! transport no longer match and are ignored.

use super::state::LinkState;

use crate::error::link::LinkError;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use log::{debug, info, warn};

/// Why a transport stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransportFailure {
    /// The transport reported an error.
    Error(String),
    /// The transport closed, with the peer's reason if one was given.
    Closed(Option<String>),
}

impl TransportFailure {
    fn describe(&self) -> String {
        match self {
            TransportFailure::Error(message) => message.clone(),
            TransportFailure::Closed(Some(reason)) if !reason.is_empty() => {
                format!("closed: {reason}")
            }
            TransportFailure::Closed(_) => "closed".to_string(),
        }
    }
}

/// Side effects requested by the state machine, executed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    /// Open a new transport tagged with `generation`.
    Open { generation: u64, url: String },
    /// Close the live transport, if any, and stop accepting sends.
    Close,
    /// Report connectivity to the caller.
    Notify(bool),
    /// Arm the one reconnect timer.
    ScheduleReconnect(Duration),
    /// Disarm the reconnect timer.
    CancelReconnect,
}

pub(crate) struct ConnectionMachine {
    state: LinkState,
    target: Option<String>,
    generation: u64,
    reconnect_pending: bool,
    manually_closed: bool,
    reconnect_delay: Duration,
}

impl ConnectionMachine {
    pub(crate) fn new(reconnect_delay: Duration) -> Self {
        Self {
            state: LinkState::Disconnected,
            target: None,
            generation: 0,
            reconnect_pending: false,
            manually_closed: false,
            reconnect_delay,
        }
    }

    pub(crate) fn state(&self) -> LinkState {
        self.state
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    pub(crate) fn is_manually_closed(&self) -> bool {
        self.manually_closed
    }

    pub(crate) fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Start a connection to `url`, replacing whatever existed before.
    pub(crate) fn connect(&mut self, url: String) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.state.has_transport() {
            info!("Closing previous bridge connection before reconnecting");
            actions.push(Action::Close);
        }
        if self.reconnect_pending {
            self.reconnect_pending = false;
            actions.push(Action::CancelReconnect);
        }

        self.manually_closed = false;
        self.target = Some(url);
        actions.extend(self.open_target());
        actions
    }

    /// The transport for `generation` finished its handshake.
    pub(crate) fn opened(&mut self, generation: u64) -> Vec<Action> {
        if !self.is_current(generation) || self.state != LinkState::Connecting {
            debug!("Ignoring open event from stale transport #{generation}");
            return Vec::new();
        }

        self.state = LinkState::Connected;
        info!(
            "Connected to bridge: {} (transport #{generation})",
            self.target().unwrap_or_default()
        );
        vec![Action::Notify(true)]
    }

    /// The transport for `generation` errored or closed.
    pub(crate) fn failed(&mut self, generation: u64, failure: TransportFailure) -> Vec<Action> {
        if !self.is_current(generation) || !self.state.has_transport() {
            debug!(
                "Ignoring failure from stale transport #{generation}: {}",
                failure.describe()
            );
            return Vec::new();
        }

        let error = if self.state == LinkState::Connecting {
            LinkError::TransportOpen {
                message: failure.describe(),
                location: ErrorLocation::from(Location::caller()),
            }
        } else {
            LinkError::TransportClosed {
                message: failure.describe(),
                location: ErrorLocation::from(Location::caller()),
            }
        };
        warn!("Bridge transport #{generation} lost: {error}");

        // Disconnected only transiently; the reconnect below moves us on.
        self.state = LinkState::Disconnected;
        let mut actions = vec![Action::Close, Action::Notify(false)];
        actions.extend(self.schedule_reconnect());
        actions
    }

    /// The reconnect timer fired.
    pub(crate) fn reconnect_due(&mut self) -> Vec<Action> {
        if !self.reconnect_pending || self.manually_closed {
            debug!("Ignoring reconnect timer: nothing pending");
            return Vec::new();
        }

        self.reconnect_pending = false;
        info!("Reconnecting to bridge");
        self.open_target()
    }

    /// Operator-initiated teardown. Final until the next `connect`.
    pub(crate) fn disconnect(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.state.has_transport() {
            info!("Closing bridge connection manually");
            actions.push(Action::Close);
        }
        if self.reconnect_pending {
            self.reconnect_pending = false;
            actions.push(Action::CancelReconnect);
        }

        self.manually_closed = true;
        self.target = None;
        // Retire the current generation so late events cannot match.
        self.generation += 1;
        self.state = LinkState::Disconnected;
        actions
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.is_manually_closed() && generation == self.generation
    }

    fn open_target(&mut self) -> Vec<Action> {
        let Some(url) = self.target.clone() else {
            self.state = LinkState::Disconnected;
            return Vec::new();
        };

        self.generation += 1;
        self.state = LinkState::Connecting;
        info!("Connecting to bridge: {url} (transport #{})", self.generation);
        vec![Action::Open {
            generation: self.generation,
            url,
        }]
    }

    fn schedule_reconnect(&mut self) -> Vec<Action> {
        if self.manually_closed || self.target.is_none() {
            self.state = LinkState::Disconnected;
            return Vec::new();
        }

        self.state = LinkState::Reconnecting;
        if self.reconnect_pending {
            debug!("Reconnect already scheduled");
            return Vec::new();
        }

        self.reconnect_pending = true;
        warn!(
            "Attempting to reconnect in {:.1}s",
            self.reconnect_delay.as_secs_f64()
        );
        vec![Action::ScheduleReconnect(self.reconnect_delay)]
    }
}
