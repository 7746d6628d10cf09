use std::sync::Arc;

use rl_core::link::{LinkLayerEvent, LinkLossReason};
use rl_core::ports::{TransportEndpoint, TransportError};
use rl_core::protocol::RecordFramer;
use rl_core::{PeerIdentity, SessionId};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::dispatcher::Dispatcher;
use super::manager::Inner;

const READ_CHUNK: usize = 1024;

pub(super) struct ReadLoopContext {
    pub generation: u64,
    pub session_id: SessionId,
    pub peer: PeerIdentity,
    pub endpoint: Arc<dyn TransportEndpoint>,
    pub link_events: mpsc::UnboundedReceiver<LinkLayerEvent>,
}

enum Step {
    Read(Result<usize, TransportError>),
    LinkEvent(Option<LinkLayerEvent>),
}

/// Read until the endpoint fails or the physical link to the peer drops,
/// then report the loss to the manager.
///
/// The framer (and so the partial-record buffer) lives and dies with this
/// task.
pub(super) async fn run(inner: Arc<Inner>, context: ReadLoopContext) {
    let ReadLoopContext {
        generation,
        session_id,
        peer,
        endpoint,
        link_events,
    } = context;

    let mut link_events = Some(link_events);
    let mut framer = RecordFramer::new();
    let dispatcher = Dispatcher::new(session_id, inner.events.clone());
    let mut buf = vec![0u8; READ_CHUNK];
    debug!(peer = %peer, "Read loop started");

    let reason = loop {
        let step = tokio::select! {
            read = endpoint.read(&mut buf) => Step::Read(read),
            event = next_link_event(&mut link_events) => Step::LinkEvent(event),
        };

        match step {
            Step::Read(Ok(0)) => break LinkLossReason::EndOfStream,
            Step::Read(Ok(n)) => {
                for record in framer.push(&buf[..n]) {
                    dispatcher.dispatch(&record);
                }
            }
            Step::Read(Err(err)) => break LinkLossReason::ReadFailed(err.to_string()),
            Step::LinkEvent(Some(LinkLayerEvent::Disconnected(address)))
                if address == peer.address =>
            {
                break LinkLossReason::LinkLayerDropped
            }
            Step::LinkEvent(Some(event)) => debug!(?event, "Ignoring link-layer event"),
            Step::LinkEvent(None) => {
                debug!("Link-layer event stream ended");
                link_events = None;
            }
        }
    };

    if !framer.pending().is_empty() {
        debug!(
            pending = framer.pending().len(),
            "Discarding unterminated record"
        );
    }
    info!(%reason, "Read loop ended");
    inner.on_link_lost(generation, reason).await;
}

async fn next_link_event(
    events: &mut Option<mpsc::UnboundedReceiver<LinkLayerEvent>>,
) -> Option<LinkLayerEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}
