//! Connect preconditions checked against mocked radio ports.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{fake_link, init_tracing, robot, Dial, FakeConnector, FakeListener};
use rl_app::{LinkDeps, LinkSessionManager, SessionConfig};
use rl_core::link::{AdapterAvailability, ChannelStrategy, LinkError, LinkState};
use rl_core::ports::mocks::{MockAdapterState, MockDiscovery};
use rl_platform::adapters::{LinkEventHub, TrustStore, TrustStoreBonding};

fn deps(
    connector: Arc<FakeConnector>,
    discovery: MockDiscovery,
    adapter: MockAdapterState,
) -> LinkDeps {
    let trust = TrustStore::default();
    trust.insert(robot().address);
    LinkDeps {
        connector,
        listener: Arc::new(FakeListener::default()),
        discovery: Arc::new(discovery),
        bonding: Arc::new(TrustStoreBonding::new(trust, true, Duration::ZERO)),
        adapter: Arc::new(adapter),
        link_events: Arc::new(LinkEventHub::default()),
    }
}

#[tokio::test]
async fn running_scan_is_cancelled_and_its_failure_ignored() {
    init_tracing();
    let mut discovery = MockDiscovery::new();
    discovery
        .expect_cancel_scan()
        .times(1)
        .returning(|| Err(anyhow::anyhow!("no scan running")));
    let mut adapter = MockAdapterState::new();
    adapter
        .expect_availability()
        .return_const(AdapterAvailability::Available);
    adapter.expect_connect_permission_granted().return_const(true);

    let connector = Arc::new(FakeConnector::default());
    connector.script(ChannelStrategy::FixedChannel(1), Dial::Succeed);
    connector.queue(fake_link(robot()).endpoint);

    let manager = LinkSessionManager::new(
        deps(connector, discovery, adapter),
        SessionConfig::default(),
    );
    manager.connect(robot()).await.unwrap();
    assert_eq!(manager.state().await, LinkState::Connected);
    manager.shutdown().await;
}

#[tokio::test]
async fn missing_radio_hardware_is_surfaced() {
    init_tracing();
    let mut discovery = MockDiscovery::new();
    discovery.expect_cancel_scan().returning(|| Ok(()));
    let mut adapter = MockAdapterState::new();
    adapter
        .expect_availability()
        .return_const(AdapterAvailability::Unsupported);
    adapter.expect_connect_permission_granted().never();

    let connector = Arc::new(FakeConnector::default());
    let manager = LinkSessionManager::new(
        deps(connector.clone(), discovery, adapter),
        SessionConfig::default(),
    );

    assert_eq!(
        manager.connect(robot()).await,
        Err(LinkError::TransportUnavailable(
            AdapterAvailability::Unsupported
        ))
    );
    assert_eq!(connector.create_calls(), 0);
    assert_eq!(manager.state().await, LinkState::Idle);
}
