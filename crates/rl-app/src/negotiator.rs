//! Connection negotiator
//!
//! The peer's service configuration cannot be known in advance, so channel
//! strategies are tried once each, in a fixed order, each connect bounded by
//! a per-attempt timeout. The first live channel wins; a failed handle is
//! always closed before the next strategy is tried.

use std::sync::Arc;
use std::time::Duration;

use rl_core::link::{AttemptFailure, ChannelStrategy, NegotiationFailed};
use rl_core::ports::{ChannelConnector, TransportEndpoint, TransportError};
use rl_core::PeerIdentity;
use tracing::{debug, info, info_span, warn, Instrument};

/// A live endpoint and the strategy that produced it.
pub struct Negotiated {
    pub endpoint: Arc<dyn TransportEndpoint>,
    pub strategy: ChannelStrategy,
}

impl std::fmt::Debug for Negotiated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Negotiated")
            .field("peer", &self.endpoint.peer())
            .field("strategy", &self.strategy)
            .finish()
    }
}

#[derive(Clone)]
pub struct ConnectionNegotiator {
    connector: Arc<dyn ChannelConnector>,
    strategies: Vec<ChannelStrategy>,
    attempt_timeout: Duration,
}

impl ConnectionNegotiator {
    pub fn new(
        connector: Arc<dyn ChannelConnector>,
        strategies: Vec<ChannelStrategy>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            connector,
            strategies,
            attempt_timeout,
        }
    }

    pub fn strategies(&self) -> &[ChannelStrategy] {
        &self.strategies
    }

    /// Try every strategy in order and return the first live endpoint.
    pub async fn negotiate(&self, peer: &PeerIdentity) -> Result<Negotiated, NegotiationFailed> {
        let span = info_span!("link.negotiate", peer = %peer.address);
        async {
            let mut attempts = Vec::with_capacity(self.strategies.len());

            for strategy in &self.strategies {
                match self.attempt(peer, *strategy).await {
                    Ok(endpoint) => {
                        info!(strategy = %strategy, "Channel established");
                        return Ok(Negotiated {
                            endpoint,
                            strategy: *strategy,
                        });
                    }
                    Err(reason) => {
                        warn!(strategy = %strategy, error = %reason, "Channel attempt failed");
                        attempts.push(AttemptFailure {
                            strategy: *strategy,
                            reason,
                        });
                    }
                }
            }

            Err(NegotiationFailed {
                peer: peer.address.clone(),
                attempts,
            })
        }
        .instrument(span)
        .await
    }

    async fn attempt(
        &self,
        peer: &PeerIdentity,
        strategy: ChannelStrategy,
    ) -> Result<Arc<dyn TransportEndpoint>, TransportError> {
        debug!(strategy = %strategy, "Creating channel");
        let mut handle = self.connector.create(peer, strategy).await?;

        match tokio::time::timeout(self.attempt_timeout, handle.connect()).await {
            Ok(Ok(())) => handle.into_endpoint(),
            Ok(Err(err)) => {
                handle.close().await;
                Err(err)
            }
            Err(_) => {
                handle.close().await;
                Err(TransportError::Timeout)
            }
        }
    }
}
