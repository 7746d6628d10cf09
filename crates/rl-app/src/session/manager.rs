//! Link session manager
//!
//! Owns at most one transport endpoint and drives the link state machine:
//!
//! ```text
//!            connect()                 negotiated
//! Idle ─────────────────► Connecting ─────────────► Connected
//!  ▲  ◄─────────────────────┘  failure                │   ▲
//!  │                                    EOF / error / │   │ accepted
//!  │ disconnect()                        link drop    ▼   │ (or redialed)
//!  └──────────────────────────────────── WaitingForPeer ─► Listening
//! ```
//!
//! Every transition happens while holding one async mutex (the transition
//! lock). Background tasks carry the generation they were spawned in; a task
//! whose generation is no longer current cannot change the state, so a
//! superseded read-loop or supervisor is harmless even before its abort
//! takes effect.
//!
//! Transitions update the state before awaiting anything, and endpoints
//! detached by a transition are closed last. A caller dropped mid-close
//! therefore never leaves the state half-updated.

use std::sync::Arc;

use chrono::Utc;
use rl_core::link::{
    AdapterAvailability, ConnectionOrigin, LinkError, LinkLossReason, LinkState, ReconnectPolicy,
    SendOutcome,
};
use rl_core::ports::{ListeningEndpoint, TransportEndpoint, TransportError};
use rl_core::protocol::OutboundCommand;
use rl_core::{PeerIdentity, SessionEvent, SessionId};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, info_span, warn, Instrument};

use super::event_bus::EventBus;
use super::read_loop::{self, ReadLoopContext};
use super::supervisor;
use super::tasks::{SessionTasks, TaskKind};
use super::SessionConfig;
use crate::negotiator::{ConnectionNegotiator, Negotiated};
use crate::pairing_monitor::PairingMonitor;
use crate::LinkDeps;

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkStatus {
    pub state: LinkState,
    /// Peer of the live endpoint, if connected.
    pub peer: Option<PeerIdentity>,
    pub session_id: Option<SessionId>,
    /// Most recently connected peer; the redial target.
    pub last_peer: Option<PeerIdentity>,
}

/// Handle to the link session. Cheap to clone; all clones share one session.
#[derive(Clone)]
pub struct LinkSessionManager {
    inner: Arc<Inner>,
}

pub(super) struct Inner {
    pub(super) deps: LinkDeps,
    pub(super) config: SessionConfig,
    pub(super) negotiator: ConnectionNegotiator,
    pairing: PairingMonitor,
    pub(super) events: EventBus,
    state: Mutex<SessionState>,
}

struct SessionState {
    link: LinkState,
    /// Bumped whenever the running tasks are replaced.
    generation: u64,
    endpoint: Option<Arc<dyn TransportEndpoint>>,
    listener: Option<Arc<dyn ListeningEndpoint>>,
    session_id: Option<SessionId>,
    peer: Option<PeerIdentity>,
    last_peer: Option<PeerIdentity>,
    tasks: SessionTasks,
    /// The running supervisor redials rather than listens.
    redialing: bool,
    shut_down: bool,
}

/// Endpoints detached from the session by a transition.
#[must_use]
#[derive(Default)]
struct Released {
    listener: Option<Arc<dyn ListeningEndpoint>>,
    endpoint: Option<Arc<dyn TransportEndpoint>>,
}

impl Released {
    async fn close(self) {
        if let Some(listener) = self.listener {
            listener.close().await;
        }
        if let Some(endpoint) = self.endpoint {
            endpoint.close().await;
        }
    }
}

impl LinkSessionManager {
    pub fn new(deps: LinkDeps, config: SessionConfig) -> Self {
        let negotiator = ConnectionNegotiator::new(
            deps.connector.clone(),
            config.strategies.clone(),
            config.attempt_timeout,
        );
        let pairing = PairingMonitor::new(deps.bonding.clone(), config.pairing_timeout);

        Self {
            inner: Arc::new(Inner {
                deps,
                config,
                negotiator,
                pairing,
                events: EventBus::default(),
                state: Mutex::new(SessionState {
                    link: LinkState::Idle,
                    generation: 0,
                    endpoint: None,
                    listener: None,
                    session_id: None,
                    peer: None,
                    last_peer: None,
                    tasks: SessionTasks::default(),
                    redialing: false,
                    shut_down: false,
                }),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Subscribe to state changes, inbound messages and failures.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub async fn state(&self) -> LinkState {
        self.inner.state.lock().await.link
    }

    pub async fn status(&self) -> LinkStatus {
        let state = self.inner.state.lock().await;
        LinkStatus {
            state: state.link,
            peer: state.peer.clone(),
            session_id: state.session_id,
            last_peer: state.last_peer.clone(),
        }
    }

    /// Connect to `peer`, pairing first if needed.
    ///
    /// Supersedes whatever the session was doing: a pending connect attempt,
    /// the read-loop and any reconnection supervisor are cancelled and a
    /// stale endpoint is closed. Failures are published as
    /// [`SessionEvent::ConnectFailed`] and returned; they are never retried.
    pub async fn connect(&self, peer: PeerIdentity) -> Result<SessionId, LinkError> {
        let attempt = {
            let mut state = self.inner.state.lock().await;
            if state.shut_down {
                return Err(LinkError::ShutDown);
            }

            let released = self.inner.teardown(&mut state);
            self.inner.set_link(&mut state, LinkState::Connecting);

            let generation = state.generation;
            let span = info_span!("link.connect", peer = %peer.address, generation);
            let handle = tokio::spawn(
                Inner::run_connect_attempt(self.inner.clone(), generation, peer).instrument(span),
            );
            state
                .tasks
                .set(TaskKind::ConnectAttempt, handle.abort_handle());
            released.close().await;
            handle
        };

        match attempt.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => {
                debug!("Connect attempt was cancelled");
                Err(LinkError::Cancelled)
            }
            Err(err) => {
                warn!(error = %err, "Connect attempt task failed");
                Err(LinkError::Cancelled)
            }
        }
    }

    /// Open a listening endpoint and wait for the peer to make first contact.
    ///
    /// A no-op while the session is already listening for the peer. From any
    /// other state, including an active redial, the current activity is torn
    /// down first.
    pub async fn listen(&self) -> Result<(), LinkError> {
        let mut state = self.inner.state.lock().await;
        if state.shut_down {
            return Err(LinkError::ShutDown);
        }
        if state.link.is_awaiting_peer() && !state.redialing {
            debug!("Already waiting for peer");
            return Ok(());
        }

        let released = self.inner.teardown(&mut state);
        self.inner.set_link(&mut state, LinkState::WaitingForPeer);
        self.inner
            .start_supervisor(&mut state, ReconnectPolicy::Passive);
        released.close().await;
        Ok(())
    }

    /// Drop the current link and stop reconnecting, keeping the manager usable.
    pub async fn disconnect(&self) {
        let mut state = self.inner.state.lock().await;
        if state.shut_down {
            return;
        }
        info!("Disconnect requested");
        let released = self.inner.teardown(&mut state);
        self.inner.set_link(&mut state, LinkState::Idle);
        released.close().await;
    }

    /// Write one command to the connected peer.
    ///
    /// The write runs under the transition lock, so the endpoint cannot be
    /// closed underneath it, and is bounded by the write timeout. A failed or
    /// stalled write is handled like a read EOF.
    pub async fn send(&self, command: &OutboundCommand) -> SendOutcome {
        let mut state = self.inner.state.lock().await;
        let endpoint = match (state.link, state.endpoint.as_ref()) {
            (LinkState::Connected, Some(endpoint)) => endpoint.clone(),
            _ => {
                debug!(%command, state = %state.link, "Not connected, dropping command");
                return SendOutcome::NotConnected;
            }
        };

        let write_timeout = self.inner.config.write_timeout;
        let written = tokio::time::timeout(write_timeout, endpoint.write(command.as_bytes()))
            .await
            .unwrap_or(Err(TransportError::Timeout));
        match written {
            Ok(()) => {
                debug!(%command, "Command sent");
                SendOutcome::Sent
            }
            Err(err) => {
                warn!(%command, error = %err, "Write failed");
                self.inner
                    .lose_link(&mut state, LinkLossReason::WriteFailed(err.to_string()), false)
                    .await;
                SendOutcome::LinkLost
            }
        }
    }

    /// Cancel every task, close the endpoint and any listening endpoint, and
    /// end all subscriptions. Idempotent.
    pub async fn shutdown(&self) {
        let mut state = self.inner.state.lock().await;
        if state.shut_down {
            return;
        }
        state.shut_down = true;
        info!("Shutting down link session");
        let released = self.inner.teardown(&mut state);
        self.inner.set_link(&mut state, LinkState::Idle);
        self.inner.events.close();
        released.close().await;
    }
}

impl Inner {
    fn set_link(&self, state: &mut SessionState, to: LinkState) {
        if state.link == to {
            return;
        }
        let from = state.link;
        state.link = to;
        info!(%from, %to, "Link state changed");
        self.events.publish(SessionEvent::StateChanged { from, to });
    }

    /// Cancel all tasks and detach every owned resource. The caller finishes
    /// its transition, then closes what is returned.
    fn teardown(&self, state: &mut SessionState) -> Released {
        state.tasks.abort_all();
        state.generation += 1;
        state.redialing = false;
        state.session_id = None;
        state.peer = None;
        Released {
            listener: state.listener.take(),
            endpoint: state.endpoint.take(),
        }
    }

    async fn run_connect_attempt(
        self: Arc<Self>,
        generation: u64,
        peer: PeerIdentity,
    ) -> Result<SessionId, LinkError> {
        if let Err(err) = self.deps.discovery.cancel_scan().await {
            debug!(error = %err, "Cancelling discovery scan failed");
        }

        match self.deps.adapter.availability() {
            AdapterAvailability::Available => {}
            other => {
                return self
                    .fail_attempt(generation, peer, LinkError::TransportUnavailable(other))
                    .await
            }
        }
        if !self.deps.adapter.connect_permission_granted() {
            return self
                .fail_attempt(generation, peer, LinkError::PermissionDenied)
                .await;
        }

        let events = self.events.clone();
        let address = peer.address.clone();
        let paired = self
            .pairing
            .ensure_paired(&peer.address, |state| {
                events.publish(SessionEvent::PairingStateChanged {
                    peer: address.clone(),
                    state,
                })
            })
            .await;
        if let Err(err) = paired {
            return self.fail_attempt(generation, peer, err.into()).await;
        }

        match self.negotiator.negotiate(&peer).await {
            Ok(Negotiated { endpoint, strategy }) => {
                let peer = with_resolved_name(peer, endpoint.as_ref());
                self.adopt(
                    generation,
                    endpoint,
                    peer,
                    ConnectionOrigin::Negotiated(strategy),
                    TaskKind::ConnectAttempt,
                )
                .await
            }
            Err(failed) => self.fail_attempt(generation, peer, failed.into()).await,
        }
    }

    async fn fail_attempt(
        &self,
        generation: u64,
        peer: PeerIdentity,
        error: LinkError,
    ) -> Result<SessionId, LinkError> {
        let mut state = self.state.lock().await;
        if state.generation != generation || state.shut_down {
            return Err(LinkError::Cancelled);
        }
        state.tasks.release(TaskKind::ConnectAttempt);
        warn!(error = %error, "Connect attempt failed");
        self.set_link(&mut state, LinkState::Idle);
        self.events.publish(SessionEvent::ConnectFailed {
            peer: Some(peer),
            error: error.clone(),
        });
        Err(error)
    }

    /// Take ownership of a live endpoint and start its read-loop.
    ///
    /// `owner` is the task handing the endpoint over; it is released rather
    /// than aborted because it is the caller.
    pub(super) async fn adopt(
        self: &Arc<Self>,
        generation: u64,
        endpoint: Arc<dyn TransportEndpoint>,
        peer: PeerIdentity,
        origin: ConnectionOrigin,
        owner: TaskKind,
    ) -> Result<SessionId, LinkError> {
        let mut state = self.state.lock().await;
        if state.generation != generation || state.shut_down {
            debug!(peer = %peer, "Discarding endpoint from a superseded task");
            endpoint.close().await;
            return Err(LinkError::Cancelled);
        }

        state.tasks.release(owner);
        state.generation += 1;
        state.redialing = false;
        let session_id = SessionId::new();
        state.endpoint = Some(endpoint.clone());
        state.session_id = Some(session_id);
        state.peer = Some(peer.clone());
        state.last_peer = Some(peer.clone());
        self.set_link(&mut state, LinkState::Connected);

        info!(%session_id, peer = %peer, ?origin, "Link established");
        self.events.publish(SessionEvent::Connected {
            session_id,
            peer: peer.clone(),
            origin,
            connected_at: Utc::now(),
        });

        // Subscribe before the loop starts so an immediate drop is not missed.
        let link_events = self.deps.link_events.subscribe();
        let context = ReadLoopContext {
            generation: state.generation,
            session_id,
            peer,
            endpoint,
            link_events,
        };
        let span = info_span!("link.read_loop", %session_id);
        let handle = tokio::spawn(read_loop::run(self.clone(), context).instrument(span));
        state.tasks.set(TaskKind::ReadLoop, handle.abort_handle());

        Ok(session_id)
    }

    /// Called by the read-loop when its endpoint stops delivering.
    pub(super) async fn on_link_lost(self: &Arc<Self>, generation: u64, reason: LinkLossReason) {
        let mut state = self.state.lock().await;
        if state.generation != generation || state.link != LinkState::Connected {
            debug!(%reason, "Ignoring link loss from a superseded read loop");
            return;
        }
        self.lose_link(&mut state, reason, true).await;
    }

    /// `Connected -> WaitingForPeer`: close the endpoint, stop the read-loop
    /// and start exactly one reconnection supervisor.
    async fn lose_link(
        self: &Arc<Self>,
        state: &mut SessionState,
        reason: LinkLossReason,
        from_read_loop: bool,
    ) {
        if from_read_loop {
            state.tasks.release(TaskKind::ReadLoop);
        } else {
            state.tasks.abort(TaskKind::ReadLoop);
        }
        state.generation += 1;
        let endpoint = state.endpoint.take();

        let session_id = state.session_id.take();
        let peer = state.peer.take();
        warn!(%reason, "Link lost, waiting for peer");
        if let (Some(session_id), Some(peer)) = (session_id, peer) {
            self.events.publish(SessionEvent::LinkLost {
                session_id,
                peer,
                reason,
            });
        }

        self.set_link(state, LinkState::WaitingForPeer);
        self.start_supervisor(state, self.config.reconnect);

        if let Some(endpoint) = endpoint {
            endpoint.close().await;
        }
    }

    fn start_supervisor(self: &Arc<Self>, state: &mut SessionState, policy: ReconnectPolicy) {
        let generation = state.generation;
        let handle = match (policy, state.last_peer.clone()) {
            (
                ReconnectPolicy::ActiveRedial {
                    max_rounds,
                    round_delay,
                },
                Some(peer),
            ) => {
                let span = info_span!("link.supervisor", policy = "active_redial", generation);
                state.redialing = true;
                tokio::spawn(
                    supervisor::redial_peer(self.clone(), generation, peer, max_rounds, round_delay)
                        .instrument(span),
                )
            }
            _ => {
                let span = info_span!("link.supervisor", policy = "passive", generation);
                state.redialing = false;
                tokio::spawn(supervisor::listen_for_peer(self.clone(), generation).instrument(span))
            }
        };
        state.tasks.set(TaskKind::Supervisor, handle.abort_handle());
    }

    /// Register the supervisor's listening endpoint. Returns `false` when the
    /// supervisor has been superseded and must close it.
    pub(super) async fn listener_opened(
        &self,
        generation: u64,
        listener: Arc<dyn ListeningEndpoint>,
    ) -> bool {
        let mut state = self.state.lock().await;
        if state.generation != generation || state.shut_down {
            return false;
        }
        let previous = state.listener.replace(listener);
        if state.link == LinkState::WaitingForPeer {
            self.set_link(&mut state, LinkState::Listening);
        }
        if let Some(previous) = previous {
            previous.close().await;
        }
        true
    }

    pub(super) async fn listener_closed(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if state.generation == generation {
            state.listener = None;
        }
    }

    pub(super) async fn redial_exhausted(&self, generation: u64, peer: PeerIdentity, rounds: u32) {
        let mut state = self.state.lock().await;
        if state.generation != generation || state.shut_down {
            return;
        }
        state.tasks.release(TaskKind::Supervisor);
        state.generation += 1;
        state.redialing = false;
        warn!(peer = %peer, rounds, "Giving up on redial");
        self.set_link(&mut state, LinkState::Idle);
        self.events.publish(SessionEvent::ConnectFailed {
            error: LinkError::ReconnectExhausted {
                peer: peer.address.clone(),
                rounds,
            },
            peer: Some(peer),
        });
    }
}

/// Prefer the requested identity, filling in a name the endpoint learned.
fn with_resolved_name(peer: PeerIdentity, endpoint: &dyn TransportEndpoint) -> PeerIdentity {
    if peer.name.is_some() {
        return peer;
    }
    let resolved = endpoint.peer();
    PeerIdentity::new(peer.address, resolved.name)
}
