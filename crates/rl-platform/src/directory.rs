use rl_core::config::{PeerEntry, RoboLinkConfig};
use rl_core::{PeerAddress, PeerIdentity};

/// Configured peers, indexed by radio address.
#[derive(Debug, Clone, Default)]
pub struct PeerDirectory {
    entries: Vec<PeerEntry>,
}

impl PeerDirectory {
    pub fn new(entries: Vec<PeerEntry>) -> Self {
        Self { entries }
    }

    pub fn from_config(config: &RoboLinkConfig) -> Self {
        Self::new(config.peers.clone())
    }

    pub fn get(&self, address: &PeerAddress) -> Option<&PeerEntry> {
        self.entries
            .iter()
            .find(|entry| PeerAddress::new(&entry.address) == *address)
    }

    /// First configured peer reachable on `host`.
    pub fn by_host(&self, host: &str) -> Option<&PeerEntry> {
        self.entries.iter().find(|entry| entry.host == host)
    }

    pub fn entries(&self) -> &[PeerEntry] {
        &self.entries
    }

    /// Identity of a configured peer, or an anonymous one.
    pub fn identity(&self, address: &PeerAddress) -> PeerIdentity {
        match self.get(address) {
            Some(entry) => entry.identity(),
            None => PeerIdentity::anonymous(address.clone()),
        }
    }
}
