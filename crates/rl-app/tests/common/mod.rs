//! In-memory transport fakes and a session harness for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rl_app::{LinkDeps, LinkSessionManager, SessionConfig};
use rl_core::link::{ChannelStrategy, LinkState, ServiceRecord};
use rl_core::ports::{
    ChannelConnector, ChannelHandle, ListenerPort, ListeningEndpoint, TransportEndpoint,
    TransportError,
};
use rl_core::{PeerIdentity, SessionEvent};
use rl_platform::adapters::{
    ConfiguredDiscovery, HostAdapterState, LinkEventHub, TrustStore, TrustStoreBonding,
};
use rl_platform::PeerDirectory;
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};

pub const ROBOT_ADDRESS: &str = "00:1A:7D:DA:71:13";

pub fn robot() -> PeerIdentity {
    PeerIdentity::new(ROBOT_ADDRESS, Some("MDP-Robot".to_string()))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// Endpoint whose inbound bytes are pushed by a [`RobotSide`].
pub struct FakeEndpoint {
    peer: PeerIdentity,
    incoming: AsyncMutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    closed: watch::Sender<bool>,
    closes: AtomicUsize,
    fail_writes: AtomicBool,
    stall_close: AtomicBool,
    written: Mutex<Vec<u8>>,
}

impl FakeEndpoint {
    pub fn close_calls(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// `close` marks the endpoint closed, then never returns.
    pub fn stall_close(&self) {
        self.stall_close.store(true, Ordering::SeqCst);
    }

    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.written.lock().unwrap()).into_owned()
    }
}

#[async_trait]
impl TransportEndpoint for FakeEndpoint {
    async fn read(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut closed = self.closed.subscribe();
        if *closed.borrow() {
            return Err(TransportError::Closed);
        }
        let mut incoming = self.incoming.lock().await;
        tokio::select! {
            chunk = incoming.recv() => match chunk {
                Some(bytes) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
                None => Ok(0),
            },
            _ = closed.changed() => Err(TransportError::Closed),
        }
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::Io("broken pipe".to_string()));
        }
        self.written.lock().unwrap().extend_from_slice(bytes);
        Ok(())
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.closed.send_replace(true);
        if self.stall_close.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    fn peer(&self) -> PeerIdentity {
        self.peer.clone()
    }
}

/// The robot's end of a fake link.
pub struct RobotSide {
    tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
    pub endpoint: Arc<FakeEndpoint>,
}

impl RobotSide {
    pub fn send(&self, bytes: &str) {
        if let Some(tx) = &self.tx {
            tx.send(bytes.as_bytes().to_vec()).unwrap();
        }
    }

    /// End of stream on the host side once buffered bytes are read.
    pub fn hang_up(&mut self) {
        self.tx = None;
    }
}

pub fn fake_link(peer: PeerIdentity) -> RobotSide {
    let (tx, rx) = mpsc::unbounded_channel();
    let (closed, _) = watch::channel(false);
    let endpoint = Arc::new(FakeEndpoint {
        peer,
        incoming: AsyncMutex::new(rx),
        closed,
        closes: AtomicUsize::new(0),
        fail_writes: AtomicBool::new(false),
        stall_close: AtomicBool::new(false),
        written: Mutex::new(Vec::new()),
    });
    RobotSide {
        tx: Some(tx),
        endpoint,
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub enum Dial {
    /// Hand out the next queued endpoint, refusing when none is queued.
    Succeed,
    Refuse,
    Hang,
}

#[derive(Default)]
pub struct FakeConnector {
    script: Mutex<HashMap<ChannelStrategy, Dial>>,
    endpoints: Arc<Mutex<VecDeque<Arc<dyn TransportEndpoint>>>>,
    creates: AtomicUsize,
}

impl FakeConnector {
    pub fn script(&self, strategy: ChannelStrategy, dial: Dial) {
        self.script.lock().unwrap().insert(strategy, dial);
    }

    pub fn queue(&self, endpoint: Arc<dyn TransportEndpoint>) {
        self.endpoints.lock().unwrap().push_back(endpoint);
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

struct FakeHandle {
    dial: Dial,
    endpoints: Arc<Mutex<VecDeque<Arc<dyn TransportEndpoint>>>>,
    connected: Option<Arc<dyn TransportEndpoint>>,
}

#[async_trait]
impl ChannelHandle for FakeHandle {
    async fn connect(&mut self) -> Result<(), TransportError> {
        match self.dial {
            Dial::Succeed => {
                let next = self.endpoints.lock().unwrap().pop_front();
                match next {
                    Some(endpoint) => {
                        self.connected = Some(endpoint);
                        Ok(())
                    }
                    None => Err(TransportError::Refused("robot not listening".to_string())),
                }
            }
            Dial::Refuse => Err(TransportError::Refused("no service".to_string())),
            Dial::Hang => std::future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.connected = None;
    }

    fn into_endpoint(self: Box<Self>) -> Result<Arc<dyn TransportEndpoint>, TransportError> {
        match self.connected {
            Some(endpoint) => Ok(endpoint),
            None => Err(TransportError::Closed),
        }
    }
}

#[async_trait]
impl ChannelConnector for FakeConnector {
    async fn create(
        &self,
        _peer: &PeerIdentity,
        strategy: ChannelStrategy,
    ) -> Result<Box<dyn ChannelHandle>, TransportError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let dial = self
            .script
            .lock()
            .unwrap()
            .get(&strategy)
            .copied()
            .unwrap_or(Dial::Refuse);
        Ok(Box::new(FakeHandle {
            dial,
            endpoints: self.endpoints.clone(),
            connected: None,
        }))
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

pub struct FakeListener {
    tx: mpsc::UnboundedSender<Arc<FakeEndpoint>>,
    incoming: Arc<AsyncMutex<mpsc::UnboundedReceiver<Arc<FakeEndpoint>>>>,
    listens: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl Default for FakeListener {
    fn default() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            incoming: Arc::new(AsyncMutex::new(rx)),
            listens: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FakeListener {
    /// The peer calls back in; accepted by the next pending `accept`.
    pub fn offer(&self, endpoint: Arc<FakeEndpoint>) {
        self.tx.send(endpoint).unwrap();
    }

    pub fn listen_calls(&self) -> usize {
        self.listens.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListenerPort for FakeListener {
    async fn listen(
        &self,
        _record: &ServiceRecord,
    ) -> Result<Arc<dyn ListeningEndpoint>, TransportError> {
        self.listens.fetch_add(1, Ordering::SeqCst);
        let (closed, _) = watch::channel(false);
        Ok(Arc::new(FakeListening {
            incoming: self.incoming.clone(),
            closed,
            closes: self.closes.clone(),
        }))
    }
}

struct FakeListening {
    incoming: Arc<AsyncMutex<mpsc::UnboundedReceiver<Arc<FakeEndpoint>>>>,
    closed: watch::Sender<bool>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl ListeningEndpoint for FakeListening {
    async fn accept(&self) -> Result<Arc<dyn TransportEndpoint>, TransportError> {
        let mut closed = self.closed.subscribe();
        if *closed.borrow() {
            return Err(TransportError::Closed);
        }
        let mut incoming = self.incoming.lock().await;
        tokio::select! {
            endpoint = incoming.recv() => match endpoint {
                Some(endpoint) => Ok(endpoint as Arc<dyn TransportEndpoint>),
                None => Err(TransportError::Closed),
            },
            _ = closed.changed() => Err(TransportError::Closed),
        }
    }

    async fn close(&self) {
        if !self.closed.send_replace(true) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Options {
    pub config: SessionConfig,
    /// Robot already bonded.
    pub trusted: bool,
    pub auto_accept_pairing: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: SessionConfig::default(),
            trusted: true,
            auto_accept_pairing: true,
        }
    }
}

pub struct Harness {
    pub manager: LinkSessionManager,
    pub connector: Arc<FakeConnector>,
    pub listener: Arc<FakeListener>,
    pub link_events: LinkEventHub,
    pub adapter: Arc<HostAdapterState>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    /// Every event received so far, in order.
    pub seen: Vec<SessionEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        init_tracing();

        let trust = TrustStore::default();
        if options.trusted {
            trust.insert(robot().address);
        }
        let connector = Arc::new(FakeConnector::default());
        let listener = Arc::new(FakeListener::default());
        let link_events = LinkEventHub::default();
        let adapter = Arc::new(HostAdapterState::new(
            rl_core::link::AdapterAvailability::Available,
            true,
        ));
        let deps = LinkDeps {
            connector: connector.clone(),
            listener: listener.clone(),
            discovery: Arc::new(ConfiguredDiscovery::new(
                Arc::new(PeerDirectory::default()),
                trust.clone(),
                Duration::from_millis(10),
            )),
            bonding: Arc::new(TrustStoreBonding::new(
                trust,
                options.auto_accept_pairing,
                Duration::from_millis(10),
            )),
            adapter: adapter.clone(),
            link_events: Arc::new(link_events.clone()),
        };

        let manager = LinkSessionManager::new(deps, options.config);
        let events = manager.subscribe();
        Self {
            manager,
            connector,
            listener,
            link_events,
            adapter,
            events,
            seen: Vec::new(),
        }
    }

    /// Script the fixed channel to succeed and connect to a fresh robot.
    pub async fn connect_robot(&mut self) -> RobotSide {
        let robot_side = fake_link(robot());
        self.connector
            .script(ChannelStrategy::FixedChannel(1), Dial::Succeed);
        self.connector.queue(robot_side.endpoint.clone());
        self.manager
            .connect(robot())
            .await
            .expect("connect to robot");
        robot_side
    }

    pub async fn next_event(&mut self) -> SessionEvent {
        let event = tokio::time::timeout(Duration::from_secs(60), self.events.recv())
            .await
            .expect("timed out waiting for a session event")
            .expect("session event stream ended");
        self.seen.push(event.clone());
        event
    }

    /// Skip events until one matches `pred`.
    pub async fn wait_for(&mut self, pred: impl Fn(&SessionEvent) -> bool) -> SessionEvent {
        loop {
            let event = self.next_event().await;
            if pred(&event) {
                return event;
            }
        }
    }

    pub async fn wait_state(&mut self, to: LinkState) {
        self.wait_for(|e| matches!(e, SessionEvent::StateChanged { to: t, .. } if *t == to))
            .await;
    }

    /// Move everything already published into `seen`.
    pub fn drain(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.seen.push(event);
        }
    }

    pub fn transitions_to(&self, state: LinkState) -> usize {
        self.seen
            .iter()
            .filter(|e| matches!(e, SessionEvent::StateChanged { to, .. } if *to == state))
            .count()
    }

    /// Remaining events once the session has shut down and the stream ended.
    pub async fn remaining_events(&mut self) -> Vec<SessionEvent> {
        let mut rest = Vec::new();
        while let Some(event) = self.events.recv().await {
            rest.push(event);
        }
        rest
    }
}
