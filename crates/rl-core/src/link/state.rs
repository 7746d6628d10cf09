use serde::{Deserialize, Serialize};
use std::fmt;

/// Link session state.
/// 链路会话状态。
///
/// Exactly one state is current at any time and every transition is
/// serialized by the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    /// No link and no pending work.
    Idle,
    /// An explicit connect request is being processed (pairing, negotiation).
    Connecting,
    /// A live endpoint is owned and the read-loop is running.
    Connected,
    /// The link dropped; the reconnection supervisor is starting up.
    WaitingForPeer,
    /// A listening endpoint is open and waiting for the peer to call in.
    Listening,
}

impl LinkState {
    pub fn is_connected(self) -> bool {
        matches!(self, LinkState::Connected)
    }

    /// States in which the reconnection supervisor is (or is about to be) active.
    pub fn is_awaiting_peer(self) -> bool {
        matches!(self, LinkState::WaitingForPeer | LinkState::Listening)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkState::Idle => "idle",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::WaitingForPeer => "waiting for peer",
            LinkState::Listening => "listening",
        };
        f.write_str(s)
    }
}
