use std::sync::{Arc, Mutex, MutexGuard};

use rl_core::SessionEvent;
use tokio::sync::mpsc;

/// Fan-out of session events to every subscriber.
///
/// Channels are unbounded so publishing under the transition lock never
/// waits on a slow subscriber. Dropped receivers are pruned on publish.
#[derive(Clone, Default)]
pub(crate) struct EventBus {
    senders: Arc<Mutex<Vec<mpsc::UnboundedSender<SessionEvent>>>>,
}

impl EventBus {
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders().push(tx);
        rx
    }

    pub fn publish(&self, event: SessionEvent) {
        self.senders().retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Drop every subscription; receivers drain and then end.
    pub fn close(&self) {
        self.senders().clear();
    }

    fn senders(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<SessionEvent>>> {
        self.senders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
