use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::pairing::{BondStateChanged, PairingState};
use crate::peer::PeerAddress;

/// Access to the radio stack's bonding (pairing) facility.
#[async_trait]
pub trait BondingPort: Send + Sync {
    async fn bond_state(&self, peer: &PeerAddress) -> anyhow::Result<PairingState>;

    /// Ask the stack to start bonding. Completion arrives as an event.
    async fn create_bond(&self, peer: &PeerAddress) -> anyhow::Result<()>;

    /// Subscribe to bond-state changes for all peers.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<BondStateChanged>;
}
