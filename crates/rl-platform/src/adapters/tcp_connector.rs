//! Channel connector that reaches peers over TCP.
//!
//! Each strategy maps to a configured route of the peer:
//! a fixed channel to its entry in `channels`, the secure service record to
//! `service_port` when `secure_service` is set, and the insecure service
//! record to `service_port` unconditionally.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use rl_core::config::PeerEntry;
use rl_core::link::{ChannelStrategy, LinkLayerEvent};
use rl_core::ports::{ChannelConnector, ChannelHandle, TransportEndpoint, TransportError};
use rl_core::PeerIdentity;
use tokio::net::TcpStream;

use super::StreamEndpoint;
use crate::directory::PeerDirectory;
use crate::hub::EventHub;

pub struct TcpChannelConnector {
    directory: Arc<PeerDirectory>,
    link_events: EventHub<LinkLayerEvent>,
}

impl TcpChannelConnector {
    pub fn new(directory: Arc<PeerDirectory>, link_events: EventHub<LinkLayerEvent>) -> Self {
        Self {
            directory,
            link_events,
        }
    }
}

/// Socket port answering `strategy` for `entry`.
fn route(entry: &PeerEntry, strategy: ChannelStrategy) -> Result<u16, TransportError> {
    match strategy {
        ChannelStrategy::FixedChannel(channel) => entry
            .channel_port(channel)
            .ok_or_else(|| TransportError::Refused(format!("channel {channel} is not exposed"))),
        ChannelStrategy::SecureServiceRecord => match entry.service_port {
            Some(port) if entry.secure_service => Ok(port),
            _ => Err(TransportError::Refused(
                "no secure service record".to_string(),
            )),
        },
        ChannelStrategy::InsecureServiceRecord => entry
            .service_port
            .ok_or_else(|| TransportError::Refused("no service record".to_string())),
    }
}

#[async_trait]
impl ChannelConnector for TcpChannelConnector {
    async fn create(
        &self,
        peer: &PeerIdentity,
        strategy: ChannelStrategy,
    ) -> Result<Box<dyn ChannelHandle>, TransportError> {
        let entry = self.directory.get(&peer.address).ok_or_else(|| {
            TransportError::Unavailable(format!("no route to {}", peer.address))
        })?;
        let port = route(entry, strategy)?;
        let address = format!("{}:{}", entry.host, port);
        debug!("Created {} handle for {} at {}", strategy, peer, address);

        let peer = match &peer.name {
            Some(_) => peer.clone(),
            None => entry.identity(),
        };
        Ok(Box::new(TcpChannelHandle {
            peer,
            address,
            stream: None,
            link_events: self.link_events.clone(),
        }))
    }
}

pub struct TcpChannelHandle {
    peer: PeerIdentity,
    address: String,
    stream: Option<TcpStream>,
    link_events: EventHub<LinkLayerEvent>,
}

#[async_trait]
impl ChannelHandle for TcpChannelHandle {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let stream = TcpStream::connect(&self.address).await?;
        stream.set_nodelay(true)?;
        info!("Connected to {} at {}", self.peer, self.address);
        self.stream = Some(stream);
        self.link_events
            .emit(LinkLayerEvent::Connected(self.peer.address.clone()));
        Ok(())
    }

    async fn close(&mut self) {
        if self.stream.take().is_some() {
            debug!("Released handle to {}", self.address);
        }
    }

    fn into_endpoint(self: Box<Self>) -> Result<Arc<dyn TransportEndpoint>, TransportError> {
        let TcpChannelHandle {
            peer,
            stream,
            link_events,
            ..
        } = *self;
        let stream = stream.ok_or(TransportError::Closed)?;
        Ok(Arc::new(
            StreamEndpoint::new(peer, stream).with_link_events(link_events),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_core::config::ChannelRoute;

    fn entry() -> PeerEntry {
        PeerEntry {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            name: None,
            host: "127.0.0.1".to_string(),
            channels: vec![ChannelRoute {
                channel: 1,
                port: 7001,
            }],
            service_port: Some(7002),
            secure_service: false,
            trusted: true,
            nearby: true,
        }
    }

    #[test]
    fn strategies_map_to_configured_routes() {
        let entry = entry();
        assert_eq!(route(&entry, ChannelStrategy::FixedChannel(1)), Ok(7001));
        assert!(route(&entry, ChannelStrategy::FixedChannel(2)).is_err());
        assert!(route(&entry, ChannelStrategy::SecureServiceRecord).is_err());
        assert_eq!(
            route(&entry, ChannelStrategy::InsecureServiceRecord),
            Ok(7002)
        );

        let secure = PeerEntry {
            secure_service: true,
            ..entry
        };
        assert_eq!(route(&secure, ChannelStrategy::SecureServiceRecord), Ok(7002));
    }

    #[tokio::test]
    async fn unknown_peer_has_no_route() {
        let connector =
            TcpChannelConnector::new(Arc::new(PeerDirectory::default()), EventHub::default());
        let result = connector
            .create(
                &PeerIdentity::anonymous("11:22:33:44:55:66"),
                ChannelStrategy::FixedChannel(1),
            )
            .await;
        assert!(matches!(result, Err(TransportError::Unavailable(_))));
    }
}
