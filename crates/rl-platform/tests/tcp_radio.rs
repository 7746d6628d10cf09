//! Localhost round trips through the TCP radio adapters.

use std::sync::Arc;
use std::time::Duration;

use rl_core::config::{ChannelRoute, PeerEntry};
use rl_core::link::{ChannelStrategy, LinkLayerEvent, ServiceRecord};
use rl_core::ports::{ChannelConnector, LinkEventPort, ListenerPort, TransportError};
use rl_core::{PeerAddress, PeerIdentity};
use rl_platform::adapters::{LinkEventHub, TcpChannelConnector, TcpListenerPort};
use rl_platform::PeerDirectory;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const ROBOT: &str = "00:1A:7D:DA:71:13";

fn robot_entry(channel_port: u16) -> PeerEntry {
    PeerEntry {
        address: ROBOT.to_string(),
        name: Some("MDP-Robot".to_string()),
        host: "127.0.0.1".to_string(),
        channels: vec![ChannelRoute {
            channel: 1,
            port: channel_port,
        }],
        service_port: None,
        secure_service: false,
        trusted: true,
        nearby: true,
    }
}

async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn connector_opens_a_fixed_channel_and_exchanges_records() {
    let robot = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = robot.local_addr().unwrap().port();
    let directory = Arc::new(PeerDirectory::new(vec![robot_entry(port)]));
    let events = LinkEventHub::default();
    let mut link_events = events.subscribe();
    let connector = TcpChannelConnector::new(directory, events.hub());

    let mut handle = connector
        .create(
            &PeerIdentity::anonymous(ROBOT),
            ChannelStrategy::FixedChannel(1),
        )
        .await
        .unwrap();
    handle.connect().await.unwrap();
    let (mut remote, _) = robot.accept().await.unwrap();
    let endpoint = handle.into_endpoint().unwrap();

    assert_eq!(endpoint.peer().name.as_deref(), Some("MDP-Robot"));
    assert_eq!(
        link_events.recv().await.unwrap(),
        LinkLayerEvent::Connected(PeerAddress::new(ROBOT))
    );

    endpoint.write(b"START\n").await.unwrap();
    let mut buf = [0u8; 6];
    remote.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"START\n");

    remote.write_all(b"ROBOT,3,4,E\n").await.unwrap();
    let mut buf = [0u8; 64];
    let n = endpoint.read(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"ROBOT,3,4,E\n");

    drop(remote);
    assert_eq!(endpoint.read(&mut buf).await.unwrap(), 0);
    assert_eq!(
        link_events.recv().await.unwrap(),
        LinkLayerEvent::Disconnected(PeerAddress::new(ROBOT))
    );
}

#[tokio::test]
async fn unexposed_strategy_is_refused() {
    let directory = Arc::new(PeerDirectory::new(vec![robot_entry(1)]));
    let connector = TcpChannelConnector::new(directory, LinkEventHub::default().hub());

    let result = connector
        .create(
            &PeerIdentity::anonymous(ROBOT),
            ChannelStrategy::SecureServiceRecord,
        )
        .await;
    assert!(matches!(result, Err(TransportError::Refused(_))));
}

#[tokio::test]
async fn listener_accepts_a_configured_peer_by_host() {
    let bind = format!("127.0.0.1:{}", free_port().await);
    let directory = Arc::new(PeerDirectory::new(vec![robot_entry(1)]));
    let port = TcpListenerPort::new(bind.clone(), directory, LinkEventHub::default().hub());

    let listening = port.listen(&ServiceRecord::default()).await.unwrap();
    let (accepted, dialed) = tokio::join!(listening.accept(), TcpStream::connect(&bind));
    let endpoint = accepted.unwrap();
    let mut dialed = dialed.unwrap();

    assert_eq!(endpoint.peer().address, PeerAddress::new(ROBOT));
    dialed.write_all(b"TARGET,2,7\n").await.unwrap();
    let mut buf = [0u8; 64];
    let n = endpoint.read(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"TARGET,2,7\n");
    listening.close().await;
}

#[tokio::test]
async fn closing_the_listener_wakes_a_pending_accept() {
    let bind = format!("127.0.0.1:{}", free_port().await);
    let port = TcpListenerPort::new(
        bind,
        Arc::new(PeerDirectory::default()),
        LinkEventHub::default().hub(),
    );
    let listening = port.listen(&ServiceRecord::default()).await.unwrap();

    let pending = {
        let listening = listening.clone();
        tokio::spawn(async move { listening.accept().await.map(|_| ()) })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    listening.close().await;
    listening.close().await;

    assert_eq!(pending.await.unwrap(), Err(TransportError::Closed));
    assert!(matches!(
        listening.accept().await,
        Err(TransportError::Closed)
    ));
}
