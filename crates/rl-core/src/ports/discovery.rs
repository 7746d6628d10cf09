use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::peer::PeerIdentity;

/// Progress of a running discovery scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    PeerFound(PeerIdentity),
    ScanFinished,
}

/// Peer discovery port.
#[async_trait]
pub trait DiscoveryPort: Send + Sync {
    /// Peers the radio stack already trusts (bonded devices).
    async fn trusted_peers(&self) -> Result<Vec<PeerIdentity>>;

    /// Start a scan. A scan already in progress is cancelled first.
    ///
    /// The returned receiver yields found peers and ends with `ScanFinished`.
    async fn start_scan(&self) -> Result<mpsc::Receiver<DiscoveryEvent>>;

    async fn cancel_scan(&self) -> Result<()>;
}
