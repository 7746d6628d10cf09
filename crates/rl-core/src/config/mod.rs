//! Configuration DTOs and their mapping to domain values.
//!
//! Every section and key is optional; missing values take the defaults in
//! `defaults.rs`.

mod defaults;
mod model;

pub use model::*;

use std::time::Duration;

use crate::link::{ChannelStrategy, ReconnectPolicy, ServiceRecord};

impl RoboLinkConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn find_peer(&self, address: &crate::PeerAddress) -> Option<&PeerEntry> {
        self.peers
            .iter()
            .find(|p| crate::PeerAddress::new(&p.address) == *address)
    }
}

impl LinkSettings {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn accept_timeout(&self) -> Duration {
        Duration::from_secs(self.accept_timeout_secs)
    }

    pub fn accept_retry_delay(&self) -> Duration {
        Duration::from_millis(self.accept_retry_delay_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn pairing_timeout(&self) -> Duration {
        Duration::from_secs(self.pairing_timeout_secs)
    }

    pub fn service_record(&self) -> ServiceRecord {
        ServiceRecord {
            uuid: self.service_uuid,
            name: self.service_name.clone(),
        }
    }

    pub fn strategies(&self) -> Vec<ChannelStrategy> {
        ChannelStrategy::default_order(self.fixed_channel)
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        match self.reconnect.policy {
            ReconnectPolicyKind::Passive => ReconnectPolicy::Passive,
            ReconnectPolicyKind::ActiveRedial => ReconnectPolicy::ActiveRedial {
                max_rounds: self.reconnect.max_rounds,
                round_delay: Duration::from_secs(self.reconnect.round_delay_secs),
            },
        }
    }
}

impl PeerEntry {
    pub fn identity(&self) -> crate::PeerIdentity {
        crate::PeerIdentity::new(self.address.as_str(), self.name.clone())
    }

    pub fn channel_port(&self, channel: u8) -> Option<u16> {
        self.channels
            .iter()
            .find(|route| route.channel == channel)
            .map(|route| route.port)
    }
}
