//! Discovery over the configured peer directory.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use rl_core::ports::{DiscoveryEvent, DiscoveryPort};
use rl_core::PeerIdentity;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::TrustStore;
use crate::directory::PeerDirectory;

const SCAN_CHANNEL_CAPACITY: usize = 16;

/// Reports every configured `nearby` peer as found, one per `interval`.
pub struct ConfiguredDiscovery {
    directory: Arc<PeerDirectory>,
    trust: TrustStore,
    interval: Duration,
    scan: Mutex<Option<JoinHandle<()>>>,
}

impl ConfiguredDiscovery {
    pub fn new(directory: Arc<PeerDirectory>, trust: TrustStore, interval: Duration) -> Self {
        Self {
            directory,
            trust,
            interval,
            scan: Mutex::new(None),
        }
    }

    fn abort_running(&self) -> bool {
        let running = self.scan.lock().ok().and_then(|mut scan| scan.take());
        match running {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl DiscoveryPort for ConfiguredDiscovery {
    async fn trusted_peers(&self) -> Result<Vec<PeerIdentity>> {
        Ok(self
            .trust
            .addresses()
            .iter()
            .map(|address| self.directory.identity(address))
            .collect())
    }

    async fn start_scan(&self) -> Result<mpsc::Receiver<DiscoveryEvent>> {
        if self.abort_running() {
            debug!("Cancelled previous scan");
        }

        let found: Vec<PeerIdentity> = self
            .directory
            .entries()
            .iter()
            .filter(|entry| entry.nearby)
            .map(|entry| entry.identity())
            .collect();
        info!("Scanning ({} peers in range)", found.len());

        let (tx, rx) = mpsc::channel(SCAN_CHANNEL_CAPACITY);
        let interval = self.interval;
        let handle = tokio::spawn(async move {
            for peer in found {
                tokio::time::sleep(interval).await;
                if tx.send(DiscoveryEvent::PeerFound(peer)).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(DiscoveryEvent::ScanFinished).await;
        });

        if let Ok(mut scan) = self.scan.lock() {
            *scan = Some(handle);
        }
        Ok(rx)
    }

    async fn cancel_scan(&self) -> Result<()> {
        if self.abort_running() {
            info!("Scan cancelled");
        }
        Ok(())
    }
}
