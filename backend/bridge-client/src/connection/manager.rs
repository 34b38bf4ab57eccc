//! Connection Manager handle and link actor.
//!
//! # Architecture
//!
//! Uses an actor pattern so every state transition is serialized:
//! - [`ConnectionManager`] sends [`LinkCommand`]s over an mpsc channel
//! - the link actor owns the [`ConnectionMachine`], the live transport and the
//!   reconnect deadline, and consumes commands, transport events and the timer
//!   from a single `select!` loop
//! - state reads go through a `watch` channel; `send` only touches the
//!   outbound writer slot, which the actor fills on open and clears on close

use super::endpoint::resolve_url;
use super::handler::LinkHandler;
use super::machine::{Action, ConnectionMachine};
use super::state::LinkState;
use super::transport::{LiveTransport, TransportEvent, TransportEventKind};

use crate::config::BridgeConfig;
use crate::dispatch::{Envelope, RobotCommand, decode_frame};
use crate::error::link::LinkError;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tokio_tungstenite::tungstenite::Message;

type OutboundSlot = Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>>;

/// Commands that drive the link actor.
enum LinkCommand {
    Connect {
        url: String,
        handler: Box<dyn LinkHandler>,
    },
    Disconnect,
}

/// Owned handle to the bridge connection.
///
/// Exactly one transport exists per manager at any time. Dropping the manager
/// stops the actor and closes the transport.
///
/// Must be created inside a Tokio runtime.
///
/// # Examples
///
/// ```no_run
/// use bridge_client::{BridgeConfig, ConnectionManager, LinkEvent, Telemetry, TopicRouter};
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let manager = ConnectionManager::new(&BridgeConfig::default());
///     let (events_tx, mut events) = mpsc::unbounded_channel();
///     manager.connect("ws://10.0.0.5:8765", events_tx)?;
///
///     let router = TopicRouter::default();
///     let mut telemetry = Telemetry::default();
///     while let Some(event) = events.recv().await {
///         if let LinkEvent::Message(envelope) = event {
///             router.apply(&mut telemetry, &envelope);
///         }
///     }
///     Ok(())
/// }
/// ```
pub struct ConnectionManager {
    commands: mpsc::UnboundedSender<LinkCommand>,
    outbound: OutboundSlot,
    state_rx: watch::Receiver<LinkState>,
    manual_stop: Arc<AtomicBool>,
    secure_origin: bool,
}

impl ConnectionManager {
    /// Create the manager and spawn its link actor.
    pub fn new(config: &BridgeConfig) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(LinkState::Disconnected);
        let outbound: OutboundSlot = Arc::new(Mutex::new(None));
        let manual_stop = Arc::new(AtomicBool::new(false));

        let actor = LinkActor {
            machine: ConnectionMachine::new(config.reconnect_delay()),
            handler: None,
            live: None,
            reconnect_at: None,
            events_tx,
            outbound: Arc::clone(&outbound),
            state_tx,
            manual_stop: Arc::clone(&manual_stop),
        };
        tokio::spawn(actor.run(command_rx, events_rx));
        info!("Bridge link actor spawned");

        Self {
            commands,
            outbound,
            state_rx,
            manual_stop,
            secure_origin: config.secure_origin,
        }
    }

    /// Connect to `url`, delivering messages and connectivity to `handler`.
    ///
    /// Any existing connection is closed first. The same URL and handler are
    /// reused for every automatic reconnect. The outcome is observed through
    /// the handler; this only fails when the URL itself is unusable.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidArgument`] for an empty or non-WebSocket URL
    /// (no transport is attempted), or [`LinkError::Actor`] if the actor is gone.
    pub fn connect<H: LinkHandler>(&self, url: &str, handler: H) -> Result<(), LinkError> {
        let url = resolve_url(url, self.secure_origin).inspect_err(|e| {
            warn!("Refusing to connect: {e}");
        })?;

        self.manual_stop.store(false, Ordering::SeqCst);
        self.commands
            .send(LinkCommand::Connect {
                url,
                handler: Box::new(handler),
            })
            .map_err(|_| LinkError::Actor {
                message: "Link actor stopped".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Serialize `{topic, data}` into one text frame and queue it on the open transport.
    ///
    /// Returns `false` without sending when no transport is open. `true` means
    /// the frame was queued, not that the bridge received it.
    pub fn send(&self, topic: &str, data: Value) -> bool {
        let guard = match self.outbound.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let Some(writer) = guard.as_ref() else {
            let rejected = LinkError::SendRejected {
                message: format!("Cannot send to {topic}, socket not open"),
                location: ErrorLocation::from(Location::caller()),
            };
            warn!("{rejected}");
            return false;
        };

        let frame = match Envelope::new(topic, data).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("{e}");
                return false;
            }
        };

        debug!("Sending message: {frame}");
        if writer.send(Message::Text(frame.into())).is_err() {
            warn!("Cannot send to {topic}, transport already closed");
            return false;
        }
        true
    }

    /// Send a typed operator command. Same contract as [`ConnectionManager::send`].
    pub fn send_command(&self, command: &RobotCommand) -> bool {
        self.send(command.topic(), command.payload())
    }

    /// Close the connection and cancel any pending reconnect. Always succeeds.
    ///
    /// Takes effect immediately for the reconnect timer: a reconnect that is
    /// already due will not fire after this returns.
    pub fn disconnect(&self) {
        self.manual_stop.store(true, Ordering::SeqCst);
        if self.commands.send(LinkCommand::Disconnect).is_err() {
            debug!("Disconnect requested after link actor stopped");
        }
    }

    pub fn state(&self) -> LinkState {
        *self.state_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// Subscribe to state changes.
    pub fn state_receiver(&self) -> watch::Receiver<LinkState> {
        self.state_rx.clone()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.manual_stop.store(true, Ordering::SeqCst);
    }
}

/// The one execution context that owns the connection.
struct LinkActor {
    machine: ConnectionMachine,
    handler: Option<Box<dyn LinkHandler>>,
    live: Option<LiveTransport>,
    reconnect_at: Option<Instant>,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    outbound: OutboundSlot,
    state_tx: watch::Sender<LinkState>,
    manual_stop: Arc<AtomicBool>,
}

impl LinkActor {
    async fn run(
        mut self,
        mut command_rx: mpsc::UnboundedReceiver<LinkCommand>,
        mut events_rx: mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        loop {
            let deadline = self.reconnect_at;

            tokio::select! {
                biased;

                command = command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = events_rx.recv() => self.handle_event(event),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.handle_reconnect_due();
                }
            }
        }

        let actions = self.machine.disconnect();
        self.execute(actions);
        info!("Bridge link actor stopped");
    }

    fn handle_command(&mut self, command: LinkCommand) {
        let actions = match command {
            LinkCommand::Connect { url, handler } => {
                self.handler = Some(handler);
                self.machine.connect(url)
            }
            LinkCommand::Disconnect => self.machine.disconnect(),
        };
        self.execute(actions);
    }

    fn handle_event(&mut self, event: TransportEvent) {
        let TransportEvent { generation, kind } = event;

        let actions = match kind {
            TransportEventKind::Opened => self.machine.opened(generation),
            TransportEventKind::Failed(failure) => self.machine.failed(generation, failure),
            TransportEventKind::Frame(text) => {
                self.deliver_frame(generation, &text);
                return;
            }
        };
        self.execute(actions);
    }

    fn handle_reconnect_due(&mut self) {
        self.reconnect_at = None;

        if self.manual_stop.load(Ordering::SeqCst) {
            debug!("Reconnect timer fired after manual disconnect, ignoring");
            return;
        }

        let actions = self.machine.reconnect_due();
        self.execute(actions);
    }

    fn deliver_frame(&mut self, generation: u64, text: &str) {
        if generation != self.machine.generation() || self.machine.state() != LinkState::Connected {
            debug!("Dropping frame from stale transport #{generation}");
            return;
        }

        match decode_frame(text) {
            Ok(envelope) => {
                if let Some(handler) = self.handler.as_mut() {
                    handler.on_message(envelope);
                }
            }
            Err(e) => warn!("Dropping inbound frame: {e}"),
        }
    }

    fn execute(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Open { generation, url } => {
                    self.live = Some(LiveTransport::open(
                        generation,
                        url,
                        self.events_tx.clone(),
                    ));
                }
                Action::Close => {
                    self.set_writer(None);
                    if let Some(live) = self.live.take() {
                        debug!("Closing transport #{}", live.generation);
                        live.close();
                    }
                }
                Action::Notify(connected) => {
                    if connected {
                        let writer = self.live.as_ref().map(|live| live.writer.clone());
                        self.set_writer(writer);
                    }
                    if let Some(handler) = self.handler.as_mut() {
                        handler.on_state_change(connected);
                    }
                }
                Action::ScheduleReconnect(delay) => {
                    self.reconnect_at = Some(Instant::now() + delay);
                }
                Action::CancelReconnect => {
                    self.reconnect_at = None;
                }
            }
        }

        let state = self.machine.state();
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    fn set_writer(&self, writer: Option<mpsc::UnboundedSender<Message>>) {
        match self.outbound.lock() {
            Ok(mut slot) => *slot = writer,
            Err(poisoned) => *poisoned.into_inner() = writer,
        }
    }
}
