//! Transport ports: channel handles, live endpoints and listening endpoints.

use async_trait::async_trait;
use std::sync::Arc;

use super::TransportError;
use crate::link::{ChannelStrategy, ServiceRecord};
use crate::peer::PeerIdentity;

/// A live bidirectional byte stream to one peer.
///
/// Reads and writes may run concurrently from different tasks. `close` must
/// be idempotent and must wake any pending `read` with either `Ok(0)` or an
/// error.
#[async_trait]
pub trait TransportEndpoint: Send + Sync {
    /// Read into `buf`. `Ok(0)` means end of stream.
    ///
    /// Must be cancel-safe: dropping the future loses no bytes.
    async fn read(&self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write all of `bytes`.
    async fn write(&self, bytes: &[u8]) -> Result<(), TransportError>;

    async fn close(&self);

    fn is_closed(&self) -> bool;

    fn peer(&self) -> PeerIdentity;
}

/// A not-yet-connected channel created for one negotiation attempt.
#[async_trait]
pub trait ChannelHandle: Send {
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Release the handle. Called on every failed attempt.
    async fn close(&mut self);

    /// Hand over the connected stream.
    fn into_endpoint(self: Box<Self>) -> Result<Arc<dyn TransportEndpoint>, TransportError>;
}

/// Creates channel handles toward a peer using one strategy.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn create(
        &self,
        peer: &PeerIdentity,
        strategy: ChannelStrategy,
    ) -> Result<Box<dyn ChannelHandle>, TransportError>;
}

/// Server-side endpoint advertised under a service record.
#[async_trait]
pub trait ListeningEndpoint: Send + Sync {
    /// Wait for one inbound connection. Cancel-safe.
    async fn accept(&self) -> Result<Arc<dyn TransportEndpoint>, TransportError>;

    async fn close(&self);
}

/// Opens listening endpoints.
#[async_trait]
pub trait ListenerPort: Send + Sync {
    async fn listen(
        &self,
        record: &ServiceRecord,
    ) -> Result<Arc<dyn ListeningEndpoint>, TransportError>;
}
