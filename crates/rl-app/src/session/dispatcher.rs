use rl_core::protocol::{classify, Classified};
use rl_core::{SessionEvent, SessionId};
use tracing::{debug, warn};

use super::event_bus::EventBus;

/// Classifies framed records and publishes the resulting events.
pub(crate) struct Dispatcher {
    session_id: SessionId,
    events: EventBus,
}

impl Dispatcher {
    pub fn new(session_id: SessionId, events: EventBus) -> Self {
        Self { session_id, events }
    }

    /// Handle one trimmed record. Malformed records are reported and dropped.
    pub fn dispatch(&self, record: &str) {
        match classify(record) {
            Ok(Classified {
                message,
                run_mode_reset,
            }) => {
                debug!(session_id = %self.session_id, %message, "Inbound record");
                self.events.publish(SessionEvent::Inbound {
                    session_id: self.session_id,
                    message,
                });
                if run_mode_reset {
                    self.events.publish(SessionEvent::RunModeReset);
                }
            }
            Err(err) => {
                warn!(session_id = %self.session_id, record, error = %err, "Dropping malformed record");
                self.events.publish(SessionEvent::MalformedRecord {
                    session_id: self.session_id,
                    record: record.to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }
}
