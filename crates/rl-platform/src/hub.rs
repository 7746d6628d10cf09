use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

/// In-process fan-out of events to any number of subscribers.
///
/// Subscribers that dropped their receiver are pruned on the next emit.
#[derive(Debug)]
pub struct EventHub<T> {
    senders: Arc<Mutex<Vec<mpsc::UnboundedSender<T>>>>,
}

impl<T> Clone for EventHub<T> {
    fn clone(&self) -> Self {
        Self {
            senders: self.senders.clone(),
        }
    }
}

impl<T> Default for EventHub<T> {
    fn default() -> Self {
        Self {
            senders: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone + Send + 'static> EventHub<T> {
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders().push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber; returns how many received it.
    pub fn emit(&self, event: T) -> usize {
        let mut senders = self.senders();
        senders.retain(|tx| tx.send(event.clone()).is_ok());
        senders.len()
    }

    fn senders(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<T>>> {
        self.senders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
