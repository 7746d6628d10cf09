//! Pairing monitor
//!
//! Resolves the pairing precondition of a connect request: subscribes to
//! bond-state events, reads the current bond state, initiates bonding when
//! the peer is unpaired and waits for the pursued peer to resolve. Events for
//! any other peer are ignored.

use std::sync::Arc;
use std::time::Duration;

use rl_core::link::PairingError;
use rl_core::pairing::{PairingPursuit, PairingState, PursuitOutcome};
use rl_core::ports::BondingPort;
use rl_core::PeerAddress;
use tracing::{debug, info, info_span, warn, Instrument};

#[derive(Clone)]
pub struct PairingMonitor {
    bonding: Arc<dyn BondingPort>,
    timeout: Duration,
}

impl PairingMonitor {
    pub fn new(bonding: Arc<dyn BondingPort>, timeout: Duration) -> Self {
        Self { bonding, timeout }
    }

    /// Return once `peer` is paired.
    ///
    /// `on_change` observes every pairing state change of the pursued peer.
    /// The bond-event subscription is dropped when this returns.
    pub async fn ensure_paired<F>(&self, peer: &PeerAddress, mut on_change: F) -> Result<(), PairingError>
    where
        F: FnMut(PairingState) + Send,
    {
        let span = info_span!("link.pairing", peer = %peer);
        async {
            // Subscribe before reading the state so no transition falls in between.
            let mut events = self.bonding.subscribe();

            let initial = self
                .bonding
                .bond_state(peer)
                .await
                .map_err(|e| PairingError::BondState {
                    peer: peer.clone(),
                    reason: format!("{e:#}"),
                })?;
            let mut pursuit = PairingPursuit::new(peer.clone(), initial);

            if pursuit.outcome() == PursuitOutcome::Paired {
                debug!("Peer already paired");
                return Ok(());
            }

            if pursuit.needs_initiation() {
                info!("Initiating pairing");
                self.bonding
                    .create_bond(peer)
                    .await
                    .map_err(|e| PairingError::Initiate {
                        peer: peer.clone(),
                        reason: format!("{e:#}"),
                    })?;
                pursuit.mark_initiated();
                on_change(pursuit.state());
            } else {
                info!("Pairing already in progress, waiting");
            }

            let wait = async {
                while let Some(event) = events.recv().await {
                    let before = pursuit.state();
                    match pursuit.observe(&event) {
                        PursuitOutcome::Ignored => continue,
                        PursuitOutcome::Pending => {
                            if pursuit.state() != before {
                                on_change(pursuit.state());
                            }
                        }
                        PursuitOutcome::Paired => {
                            info!("Pairing completed");
                            on_change(PairingState::Paired);
                            return Ok(());
                        }
                        PursuitOutcome::Failed => {
                            warn!("Pairing failed or was cancelled");
                            on_change(PairingState::Unpaired);
                            return Err(PairingError::Failed { peer: peer.clone() });
                        }
                    }
                }
                Err(PairingError::MonitorClosed { peer: peer.clone() })
            };

            match tokio::time::timeout(self.timeout, wait).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_secs = self.timeout.as_secs(), "Pairing timed out");
                    Err(PairingError::TimedOut {
                        peer: peer.clone(),
                        secs: self.timeout.as_secs(),
                    })
                }
            }
        }
        .instrument(span)
        .await
    }
}
