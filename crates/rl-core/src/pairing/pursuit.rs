//! Pairing pursuit state machine
//!
//! Tracks exactly one peer whose pairing the controller is waiting on. Pure
//! transitions: `(pursuit, event) -> outcome`; the app layer owns the event
//! subscription and the waiting.
//!
//! 配对追踪状态机：同一时间只追踪一个对端，其他对端的事件一律忽略。

use super::{BondStateChanged, PairingState};
use crate::peer::PeerAddress;

/// Result of feeding a bond-state event into a pursuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuitOutcome {
    /// Event concerned another peer.
    Ignored,
    /// Still waiting for the pursued peer to resolve.
    Pending,
    /// The pursued peer is now trusted.
    Paired,
    /// Pairing failed, was rejected or cancelled.
    Failed,
}

#[derive(Debug, Clone)]
pub struct PairingPursuit {
    target: PeerAddress,
    state: PairingState,
}

impl PairingPursuit {
    /// Start pursuing `target`, whose bond state was last observed as `initial`.
    pub fn new(target: PeerAddress, initial: PairingState) -> Self {
        Self {
            target,
            state: initial,
        }
    }

    pub fn target(&self) -> &PeerAddress {
        &self.target
    }

    pub fn state(&self) -> PairingState {
        self.state
    }

    /// Whether the caller must ask the radio stack to start pairing.
    ///
    /// Only an `Unpaired` peer needs initiation; a peer already `Pairing` is
    /// simply waited on.
    pub fn needs_initiation(&self) -> bool {
        self.state == PairingState::Unpaired
    }

    /// Record that pairing was requested from the radio stack.
    pub fn mark_initiated(&mut self) {
        if self.state == PairingState::Unpaired {
            self.state = PairingState::Pairing;
        }
    }

    /// Current outcome without any new event.
    pub fn outcome(&self) -> PursuitOutcome {
        match self.state {
            PairingState::Paired => PursuitOutcome::Paired,
            _ => PursuitOutcome::Pending,
        }
    }

    /// Feed one bond-state event.
    pub fn observe(&mut self, event: &BondStateChanged) -> PursuitOutcome {
        if event.peer != self.target {
            return PursuitOutcome::Ignored;
        }

        self.state = event.state;
        match event.state {
            PairingState::Paired => PursuitOutcome::Paired,
            PairingState::Pairing => PursuitOutcome::Pending,
            // The stack falls back to "none" when the user rejects or the
            // exchange times out.
            PairingState::Unpaired => PursuitOutcome::Failed,
        }
    }
}
