use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level RoboLink configuration, loaded from `config.toml`.
/// RoboLink 顶层配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoboLinkConfig {
    pub link: LinkSettings,
    pub radio: RadioSettings,
    pub peers: Vec<PeerEntry>,
}

/// Link session tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    pub service_uuid: Uuid,
    pub service_name: String,
    pub fixed_channel: u8,
    /// Per-strategy connect timeout.
    pub attempt_timeout_secs: u64,
    /// How long one listening endpoint waits for the peer to call back.
    pub accept_timeout_secs: u64,
    /// Pause before reopening the listening endpoint.
    pub accept_retry_delay_ms: u64,
    /// Bound on one outbound write; a peer that stops draining loses the link.
    pub write_timeout_secs: u64,
    pub pairing_timeout_secs: u64,
    pub reconnect: ReconnectSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconnectPolicyKind {
    Passive,
    ActiveRedial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectSettings {
    pub policy: ReconnectPolicyKind,
    /// Redial rounds before giving up (active redial only).
    pub max_rounds: u32,
    pub round_delay_secs: u64,
}

/// Host radio emulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioSettings {
    /// `false` behaves like a powered-off adapter.
    pub enabled: bool,
    pub connect_permission: bool,
    /// Address the listening endpoint binds to.
    pub listen_address: String,
    /// Accept bonding requests without operator confirmation.
    pub auto_accept_pairing: bool,
    /// Simulated delay between bonding request and result.
    pub pairing_delay_ms: u64,
}

/// A known peer and the routes that reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerEntry {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Host the peer's channels are reachable on.
    #[serde(default = "default_peer_host")]
    pub host: String,
    /// Fixed channel number to port mapping.
    #[serde(default)]
    pub channels: Vec<ChannelRoute>,
    /// Port answering service-record lookups.
    #[serde(default)]
    pub service_port: Option<u16>,
    /// Whether the service accepts authenticated (secure) lookups.
    #[serde(default)]
    pub secure_service: bool,
    /// Already bonded with this host.
    #[serde(default)]
    pub trusted: bool,
    /// Reported by discovery scans.
    #[serde(default = "default_true")]
    pub nearby: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRoute {
    pub channel: u8,
    pub port: u16,
}

fn default_peer_host() -> String {
    "127.0.0.1".to_string()
}

fn default_true() -> bool {
    true
}
