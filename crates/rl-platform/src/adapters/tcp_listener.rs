//! Listening endpoint over a TCP listener.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use rl_core::link::{LinkLayerEvent, ServiceRecord};
use rl_core::ports::{ListenerPort, ListeningEndpoint, TransportEndpoint, TransportError};
use rl_core::PeerIdentity;
use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex as AsyncMutex};

use super::StreamEndpoint;
use crate::directory::PeerDirectory;
use crate::hub::EventHub;

/// Opens TCP listening endpoints on a fixed bind address.
pub struct TcpListenerPort {
    bind_address: String,
    directory: Arc<PeerDirectory>,
    link_events: EventHub<LinkLayerEvent>,
}

impl TcpListenerPort {
    pub fn new(
        bind_address: impl Into<String>,
        directory: Arc<PeerDirectory>,
        link_events: EventHub<LinkLayerEvent>,
    ) -> Self {
        Self {
            bind_address: bind_address.into(),
            directory,
            link_events,
        }
    }
}

#[async_trait]
impl ListenerPort for TcpListenerPort {
    async fn listen(
        &self,
        record: &ServiceRecord,
    ) -> Result<Arc<dyn ListeningEndpoint>, TransportError> {
        let listener = TcpListener::bind(&self.bind_address).await?;
        let local_address = listener.local_addr()?;
        info!(
            "Listening for service {} ({}) on {}",
            record.name, record.uuid, local_address
        );
        let (closed_tx, _) = watch::channel(false);
        Ok(Arc::new(TcpListeningEndpoint {
            listener: AsyncMutex::new(Some(listener)),
            local_address,
            closed_tx,
            directory: self.directory.clone(),
            link_events: self.link_events.clone(),
        }))
    }
}

pub struct TcpListeningEndpoint {
    listener: AsyncMutex<Option<TcpListener>>,
    local_address: SocketAddr,
    closed_tx: watch::Sender<bool>,
    directory: Arc<PeerDirectory>,
    link_events: EventHub<LinkLayerEvent>,
}

impl TcpListeningEndpoint {
    pub fn local_address(&self) -> SocketAddr {
        self.local_address
    }

    /// Map an inbound socket back to a configured peer by host.
    fn identify(&self, remote: SocketAddr) -> PeerIdentity {
        match self.directory.by_host(&remote.ip().to_string()) {
            Some(entry) => entry.identity(),
            None => PeerIdentity::anonymous(remote.to_string()),
        }
    }
}

#[async_trait]
impl ListeningEndpoint for TcpListeningEndpoint {
    async fn accept(&self) -> Result<Arc<dyn TransportEndpoint>, TransportError> {
        let mut closed = self.closed_tx.subscribe();
        if *closed.borrow() {
            return Err(TransportError::Closed);
        }

        let guard = self.listener.lock().await;
        let listener = guard.as_ref().ok_or(TransportError::Closed)?;
        let (stream, remote) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = closed.changed() => return Err(TransportError::Closed),
        };
        drop(guard);

        stream.set_nodelay(true)?;
        let peer = self.identify(remote);
        info!("Accepted {} from {}", peer, remote);
        self.link_events
            .emit(LinkLayerEvent::Connected(peer.address.clone()));
        Ok(Arc::new(
            StreamEndpoint::new(peer, stream).with_link_events(self.link_events.clone()),
        ))
    }

    async fn close(&self) {
        if self.closed_tx.send_replace(true) {
            return;
        }
        // A pending accept has been woken and releases the lock.
        if self.listener.lock().await.take().is_some() {
            debug!("Closed listener on {}", self.local_address);
        }
    }
}
