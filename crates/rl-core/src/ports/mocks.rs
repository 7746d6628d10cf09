//! Mock implementations of the radio ports for testing.
//!
//! Enabled for this crate's own tests and, through the `testing` feature, for
//! downstream crates that want to drive orchestration without a radio stack.

use async_trait::async_trait;
use mockall::mock;
use tokio::sync::mpsc;

use super::{AdapterStatePort, BondingPort, DiscoveryEvent, DiscoveryPort};
use crate::link::AdapterAvailability;
use crate::pairing::{BondStateChanged, PairingState};
use crate::peer::{PeerAddress, PeerIdentity};

mock! {
    pub AdapterState {}

    impl AdapterStatePort for AdapterState {
        fn availability(&self) -> AdapterAvailability;
        fn connect_permission_granted(&self) -> bool;
    }
}

mock! {
    pub Bonding {}

    #[async_trait]
    impl BondingPort for Bonding {
        async fn bond_state(&self, peer: &PeerAddress) -> anyhow::Result<PairingState>;
        async fn create_bond(&self, peer: &PeerAddress) -> anyhow::Result<()>;
        fn subscribe(&self) -> mpsc::UnboundedReceiver<BondStateChanged>;
    }
}

mock! {
    pub Discovery {}

    #[async_trait]
    impl DiscoveryPort for Discovery {
        async fn trusted_peers(&self) -> anyhow::Result<Vec<PeerIdentity>>;
        async fn start_scan(&self) -> anyhow::Result<mpsc::Receiver<DiscoveryEvent>>;
        async fn cancel_scan(&self) -> anyhow::Result<()>;
    }
}
