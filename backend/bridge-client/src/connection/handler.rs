use crate::dispatch::Envelope;

use tokio::sync::mpsc;

/// Receiver of everything a connection produces.
///
/// Methods run on the link actor, one call at a time and in transport order.
/// Implementations must not block.
pub trait LinkHandler: Send + 'static {
    /// A decoded inbound envelope. Malformed frames never reach this.
    fn on_message(&mut self, envelope: Envelope);

    /// `true` when a transport opens, `false` when it fails or closes unexpectedly.
    fn on_state_change(&mut self, _connected: bool) {}
}

/// Channel form of the [`LinkHandler`] callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Message(Envelope),
    StateChanged(bool),
}

impl LinkHandler for mpsc::UnboundedSender<LinkEvent> {
    fn on_message(&mut self, envelope: Envelope) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.send(LinkEvent::Message(envelope));
    }

    fn on_state_change(&mut self, connected: bool) {
        let _ = self.send(LinkEvent::StateChanged(connected));
    }
}
