//! Trust store and the bonding adapter built on it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use log::{info, warn};
use rl_core::config::PeerEntry;
use rl_core::pairing::{BondStateChanged, PairingState};
use rl_core::ports::BondingPort;
use rl_core::PeerAddress;
use tokio::sync::mpsc;

use crate::hub::EventHub;

/// Set of bonded peer addresses, shared between discovery and bonding.
#[derive(Debug, Clone, Default)]
pub struct TrustStore {
    bonded: Arc<RwLock<HashSet<PeerAddress>>>,
}

impl TrustStore {
    /// Seed with every configured peer marked `trusted`.
    pub fn from_entries(entries: &[PeerEntry]) -> Self {
        let bonded = entries
            .iter()
            .filter(|entry| entry.trusted)
            .map(|entry| PeerAddress::new(&entry.address))
            .collect();
        Self {
            bonded: Arc::new(RwLock::new(bonded)),
        }
    }

    pub fn contains(&self, peer: &PeerAddress) -> bool {
        self.bonded
            .read()
            .map(|set| set.contains(peer))
            .unwrap_or(false)
    }

    pub fn insert(&self, peer: PeerAddress) {
        if let Ok(mut set) = self.bonded.write() {
            set.insert(peer);
        }
    }

    pub fn remove(&self, peer: &PeerAddress) -> bool {
        self.bonded
            .write()
            .map(|mut set| set.remove(peer))
            .unwrap_or(false)
    }

    pub fn addresses(&self) -> Vec<PeerAddress> {
        let mut addresses: Vec<_> = self
            .bonded
            .read()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        addresses.sort();
        addresses
    }
}

/// Bonding backed by a [`TrustStore`].
///
/// `create_bond` reports `Pairing` immediately and resolves after the
/// configured delay: the peer is bonded when requests are auto-accepted,
/// otherwise the request is rejected and `Unpaired` is reported.
pub struct TrustStoreBonding {
    store: TrustStore,
    auto_accept: bool,
    delay: Duration,
    hub: EventHub<BondStateChanged>,
    pending: Arc<Mutex<HashSet<PeerAddress>>>,
}

impl TrustStoreBonding {
    pub fn new(store: TrustStore, auto_accept: bool, delay: Duration) -> Self {
        Self {
            store,
            auto_accept,
            delay,
            hub: EventHub::default(),
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Drop a bond, as if the operator removed the device.
    pub fn forget(&self, peer: &PeerAddress) {
        if self.store.remove(peer) {
            info!("Removed bond with {}", peer);
            self.hub
                .emit(BondStateChanged::new(peer.clone(), PairingState::Unpaired));
        }
    }

    fn is_pending(&self, peer: &PeerAddress) -> bool {
        self.pending
            .lock()
            .map(|set| set.contains(peer))
            .unwrap_or(false)
    }
}

#[async_trait]
impl BondingPort for TrustStoreBonding {
    async fn bond_state(&self, peer: &PeerAddress) -> Result<PairingState> {
        if self.store.contains(peer) {
            Ok(PairingState::Paired)
        } else if self.is_pending(peer) {
            Ok(PairingState::Pairing)
        } else {
            Ok(PairingState::Unpaired)
        }
    }

    async fn create_bond(&self, peer: &PeerAddress) -> Result<()> {
        {
            let mut pending = match self.pending.lock() {
                Ok(pending) => pending,
                Err(_) => bail!("bonding state is unavailable"),
            };
            if !pending.insert(peer.clone()) {
                bail!("bonding with {peer} already in progress");
            }
        }

        info!("Bonding requested with {}", peer);
        self.hub
            .emit(BondStateChanged::new(peer.clone(), PairingState::Pairing));

        let peer = peer.clone();
        let store = self.store.clone();
        let hub = self.hub.clone();
        let pending = self.pending.clone();
        let auto_accept = self.auto_accept;
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Ok(mut set) = pending.lock() {
                set.remove(&peer);
            }
            let state = if auto_accept {
                store.insert(peer.clone());
                info!("Bonded with {}", peer);
                PairingState::Paired
            } else {
                warn!("Bonding with {} was rejected", peer);
                PairingState::Unpaired
            };
            hub.emit(BondStateChanged::new(peer, state));
        });
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<BondStateChanged> {
        self.hub.subscribe()
    }
}
