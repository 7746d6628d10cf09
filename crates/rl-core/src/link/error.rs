//! Errors surfaced to the operator.
//!
//! Only conditions that need a fresh user decision live here (radio off,
//! permission, pairing, exhausted negotiation). Post-connect I/O failures are
//! recovered automatically and show up as [`super::SessionEvent::LinkLost`]
//! instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::ChannelStrategy;
use crate::peer::PeerAddress;
use crate::ports::TransportError;

/// Radio adapter availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterAvailability {
    Available,
    PoweredOff,
    Unsupported,
}

impl fmt::Display for AdapterAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdapterAvailability::Available => "available",
            AdapterAvailability::PoweredOff => "radio is powered off",
            AdapterAvailability::Unsupported => "no radio hardware",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("pairing with {peer} failed or was cancelled")]
    Failed { peer: PeerAddress },

    #[error("pairing with {peer} did not resolve within {secs}s")]
    TimedOut { peer: PeerAddress, secs: u64 },

    #[error("bond events stopped before pairing with {peer} resolved")]
    MonitorClosed { peer: PeerAddress },

    #[error("could not start pairing with {peer}: {reason}")]
    Initiate { peer: PeerAddress, reason: String },

    #[error("could not read bond state of {peer}: {reason}")]
    BondState { peer: PeerAddress, reason: String },
}

/// One failed negotiation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub strategy: ChannelStrategy,
    pub reason: TransportError,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// Every channel strategy failed for a peer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to open a channel to {peer} ({})", join_attempts(.attempts))]
pub struct NegotiationFailed {
    pub peer: PeerAddress,
    pub attempts: Vec<AttemptFailure>,
}

fn join_attempts(attempts: &[AttemptFailure]) -> String {
    if attempts.is_empty() {
        return "no strategies configured".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("radio transport unavailable: {0}")]
    TransportUnavailable(AdapterAvailability),

    #[error("radio connect permission not granted")]
    PermissionDenied,

    #[error(transparent)]
    Pairing(#[from] PairingError),

    #[error(transparent)]
    Negotiation(#[from] NegotiationFailed),

    #[error("gave up reconnecting to {peer} after {rounds} rounds")]
    ReconnectExhausted { peer: PeerAddress, rounds: u32 },

    #[error("connect attempt was superseded or cancelled")]
    Cancelled,

    #[error("link session manager has shut down")]
    ShutDown,
}
