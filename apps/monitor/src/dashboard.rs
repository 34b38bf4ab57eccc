//! Folds link events into the telemetry snapshot the operator sees.

use bridge_client::{LinkEvent, Telemetry, TopicRouter};

use log::{info, warn};

pub struct Dashboard {
    router: TopicRouter,
    telemetry: Telemetry,
    connected: bool,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(TopicRouter::default())
    }
}

impl Dashboard {
    pub fn new(router: TopicRouter) -> Self {
        Self {
            router,
            telemetry: Telemetry::default(),
            connected: false,
        }
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Apply one event. Returns `true` when the snapshot or connectivity changed.
    pub fn handle(&mut self, event: LinkEvent) -> bool {
        match event {
            LinkEvent::StateChanged(connected) => {
                if connected {
                    info!("Bridge connected");
                } else {
                    warn!("Bridge connection lost");
                }
                let changed = self.connected != connected;
                self.connected = connected;
                changed
            }
            LinkEvent::Message(envelope) => {
                let changed = self.router.apply(&mut self.telemetry, &envelope);
                if changed {
                    info!("{}", self.telemetry);
                }
                changed
            }
        }
    }
}
