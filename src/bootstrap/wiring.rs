//! # Dependency Injection / 依赖注入模块
//!
//! The only place that knows both `rl-app` and `rl-platform`. It assembles
//! adapters from the configuration and hands them to the session manager as
//! ports; it makes no link decisions of its own.

use std::sync::Arc;
use std::time::Duration;

use rl_app::{LinkDeps, LinkSessionManager, SessionConfig};
use rl_core::RoboLinkConfig;
use rl_platform::adapters::{
    ConfiguredDiscovery, HostAdapterState, LinkEventHub, TcpChannelConnector, TcpListenerPort,
    TrustStore, TrustStoreBonding,
};
use rl_platform::PeerDirectory;

/// Interval between peers reported by a discovery scan.
const SCAN_INTERVAL: Duration = Duration::from_millis(300);

/// Everything the shell drives after wiring.
pub struct LinkRuntime {
    pub manager: LinkSessionManager,
    pub discovery: Arc<ConfiguredDiscovery>,
    pub directory: Arc<PeerDirectory>,
    pub adapter: Arc<HostAdapterState>,
}

pub fn wire_link(config: &RoboLinkConfig) -> LinkRuntime {
    let directory = Arc::new(PeerDirectory::from_config(config));
    let trust = TrustStore::from_entries(&config.peers);
    let link_events = LinkEventHub::default();

    let connector = Arc::new(TcpChannelConnector::new(
        directory.clone(),
        link_events.hub(),
    ));
    let listener = Arc::new(TcpListenerPort::new(
        config.radio.listen_address.clone(),
        directory.clone(),
        link_events.hub(),
    ));
    let discovery = Arc::new(ConfiguredDiscovery::new(
        directory.clone(),
        trust.clone(),
        SCAN_INTERVAL,
    ));
    let bonding = Arc::new(TrustStoreBonding::new(
        trust,
        config.radio.auto_accept_pairing,
        Duration::from_millis(config.radio.pairing_delay_ms),
    ));
    let adapter = Arc::new(HostAdapterState::from_settings(&config.radio));

    let deps = LinkDeps {
        connector,
        listener,
        discovery: discovery.clone(),
        bonding,
        adapter: adapter.clone(),
        link_events: Arc::new(link_events),
    };
    let manager = LinkSessionManager::new(deps, SessionConfig::from_settings(&config.link));

    LinkRuntime {
        manager,
        discovery,
        directory,
        adapter,
    }
}
