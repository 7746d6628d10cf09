//! Transport endpoint over any tokio byte stream.

use async_trait::async_trait;
use log::{debug, warn};
use rl_core::link::LinkLayerEvent;
use rl_core::ports::{TransportEndpoint, TransportError};
use rl_core::PeerIdentity;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{watch, Mutex as AsyncMutex};

use crate::hub::EventHub;

/// A [`TransportEndpoint`] backed by a split tokio stream.
///
/// `close` flips a watch flag that wakes a pending `read` with
/// [`TransportError::Closed`] and then shuts the write half down. When a
/// link-event hub is attached, an end of stream or read error observed here
/// is also reported as the physical link going down.
pub struct StreamEndpoint<S> {
    peer: PeerIdentity,
    reader: AsyncMutex<ReadHalf<S>>,
    writer: AsyncMutex<WriteHalf<S>>,
    closed_tx: watch::Sender<bool>,
    link_events: Option<EventHub<LinkLayerEvent>>,
}

impl<S> StreamEndpoint<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(peer: PeerIdentity, stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        let (closed_tx, _) = watch::channel(false);
        Self {
            peer,
            reader: AsyncMutex::new(reader),
            writer: AsyncMutex::new(writer),
            closed_tx,
            link_events: None,
        }
    }

    pub fn with_link_events(mut self, hub: EventHub<LinkLayerEvent>) -> Self {
        self.link_events = Some(hub);
        self
    }

    fn report_link_down(&self) {
        if let Some(hub) = &self.link_events {
            hub.emit(LinkLayerEvent::Disconnected(self.peer.address.clone()));
        }
    }
}

#[async_trait]
impl<S> TransportEndpoint for StreamEndpoint<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    async fn read(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut closed = self.closed_tx.subscribe();
        if *closed.borrow() {
            return Err(TransportError::Closed);
        }

        let mut reader = self.reader.lock().await;
        let result = tokio::select! {
            read = reader.read(buf) => read.map_err(TransportError::from),
            _ = closed.changed() => Err(TransportError::Closed),
        };

        match &result {
            Ok(0) => {
                debug!("Stream from {} reached end of stream", self.peer);
                self.report_link_down();
            }
            Err(TransportError::Closed) => {}
            Err(err) => {
                warn!("Read from {} failed: {}", self.peer, err);
                self.report_link_down();
            }
            Ok(_) => {}
        }
        result
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut writer = self.writer.lock().await;
        writer.write_all(bytes).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn close(&self) {
        if self.closed_tx.send_replace(true) {
            return;
        }
        debug!("Closing stream to {}", self.peer);
        let mut writer = self.writer.lock().await;
        if let Err(err) = writer.shutdown().await {
            debug!("Shutdown of stream to {} failed: {}", self.peer, err);
        }
    }

    fn is_closed(&self) -> bool {
        *self.closed_tx.borrow()
    }

    fn peer(&self) -> PeerIdentity {
        self.peer.clone()
    }
}
