use serde::{Deserialize, Serialize};

use super::PairingState;
use crate::peer::PeerAddress;

/// Bond-state transition reported by the radio stack for some peer.
///
/// The stack reports transitions for every peer it knows about; consumers
/// filter by address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondStateChanged {
    pub peer: PeerAddress,
    pub state: PairingState,
}

impl BondStateChanged {
    pub fn new(peer: impl Into<PeerAddress>, state: PairingState) -> Self {
        Self {
            peer: peer.into(),
            state,
        }
    }
}
