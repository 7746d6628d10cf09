//! Reconnection supervisor
//!
//! Runs after an established link drops. The passive variant opens a
//! listening endpoint under the well-known service record and waits for the
//! peer to call back in, reopening after every timeout or accept error until
//! cancelled. The active variant re-runs negotiation against the last peer
//! for a bounded number of rounds.

use std::sync::Arc;
use std::time::Duration;

use rl_core::link::ConnectionOrigin;
use rl_core::PeerIdentity;
use tracing::{debug, info, warn};

use super::manager::Inner;
use super::tasks::TaskKind;
use crate::negotiator::Negotiated;

pub(super) async fn listen_for_peer(inner: Arc<Inner>, generation: u64) {
    let record = inner.config.service_record.clone();
    let accept_timeout = inner.config.accept_timeout;

    loop {
        match inner.deps.listener.listen(&record).await {
            Ok(listener) => {
                if !inner.listener_opened(generation, listener.clone()).await {
                    listener.close().await;
                    return;
                }
                debug!(service = %record.name, "Listening for peer");

                let accepted = tokio::time::timeout(accept_timeout, listener.accept()).await;
                // At most one listening endpoint: always close before adopting or reopening.
                listener.close().await;
                inner.listener_closed(generation).await;

                match accepted {
                    Ok(Ok(endpoint)) => {
                        let peer = endpoint.peer();
                        info!(peer = %peer, "Peer called back in");
                        if let Err(err) = inner
                            .adopt(
                                generation,
                                endpoint,
                                peer,
                                ConnectionOrigin::Accepted,
                                TaskKind::Supervisor,
                            )
                            .await
                        {
                            debug!(error = %err, "Accepted endpoint was not adopted");
                        }
                        return;
                    }
                    Ok(Err(err)) => warn!(error = %err, "Accept failed"),
                    Err(_) => debug!(
                        timeout_secs = accept_timeout.as_secs(),
                        "No peer called back before the accept timeout"
                    ),
                }
            }
            Err(err) => warn!(error = %err, "Opening listening endpoint failed"),
        }

        tokio::time::sleep(inner.config.accept_retry_delay).await;
    }
}

pub(super) async fn redial_peer(
    inner: Arc<Inner>,
    generation: u64,
    peer: PeerIdentity,
    max_rounds: u32,
    round_delay: Duration,
) {
    for round in 1..=max_rounds {
        tokio::time::sleep(round_delay).await;
        info!(round, max_rounds, peer = %peer, "Redialing peer");

        match inner.negotiator.negotiate(&peer).await {
            Ok(Negotiated { endpoint, strategy }) => {
                if let Err(err) = inner
                    .adopt(
                        generation,
                        endpoint,
                        peer,
                        ConnectionOrigin::Redialed(strategy),
                        TaskKind::Supervisor,
                    )
                    .await
                {
                    debug!(error = %err, "Redialed endpoint was not adopted");
                }
                return;
            }
            Err(failed) => warn!(round, error = %failed, "Redial round failed"),
        }
    }

    inner.redial_exhausted(generation, peer, max_rounds).await;
}
