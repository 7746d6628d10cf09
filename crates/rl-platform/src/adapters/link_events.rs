use rl_core::link::LinkLayerEvent;
use rl_core::ports::LinkEventPort;
use tokio::sync::mpsc;

use crate::hub::EventHub;

/// Link-layer notifications shared by every endpoint of the TCP radio.
#[derive(Debug, Clone, Default)]
pub struct LinkEventHub {
    hub: EventHub<LinkLayerEvent>,
}

impl LinkEventHub {
    /// Hub handed to connectors and listeners so their endpoints report here.
    pub fn hub(&self) -> EventHub<LinkLayerEvent> {
        self.hub.clone()
    }

    pub fn emit(&self, event: LinkLayerEvent) -> usize {
        self.hub.emit(event)
    }
}

impl LinkEventPort for LinkEventHub {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<LinkLayerEvent> {
        self.hub.subscribe()
    }
}
