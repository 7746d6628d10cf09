use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ChannelStrategy, LinkError, LinkState};
use crate::ids::SessionId;
use crate::pairing::PairingState;
use crate::peer::{PeerAddress, PeerIdentity};
use crate::protocol::InboundMessage;

/// How a connected session's endpoint was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionOrigin {
    /// Explicit connect request, negotiated with the given strategy.
    Negotiated(ChannelStrategy),
    /// The peer called back in on the listening endpoint.
    Accepted,
    /// Active redial after a drop.
    Redialed(ChannelStrategy),
}

/// Why an established link was lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkLossReason {
    EndOfStream,
    ReadFailed(String),
    WriteFailed(String),
    /// The radio stack reported the physical link to the peer went down.
    LinkLayerDropped,
}

impl fmt::Display for LinkLossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkLossReason::EndOfStream => f.write_str("stream closed by peer"),
            LinkLossReason::ReadFailed(e) => write!(f, "read failed: {e}"),
            LinkLossReason::WriteFailed(e) => write!(f, "write failed: {e}"),
            LinkLossReason::LinkLayerDropped => f.write_str("physical link dropped"),
        }
    }
}

/// Out-of-band link-layer notification from the radio stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkLayerEvent {
    Connected(PeerAddress),
    Disconnected(PeerAddress),
}

/// Result of sending one command on the session manager.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Record written to the endpoint.
    Sent,
    /// Nothing was written: no link is established.
    NotConnected,
    /// The write failed and the session moved to passive reconnection.
    LinkLost,
}

/// Events published by the link session manager to the presentation layer.
/// 会话管理器发布给展示层的事件。
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged {
        from: LinkState,
        to: LinkState,
    },
    PairingStateChanged {
        peer: PeerAddress,
        state: PairingState,
    },
    Connected {
        session_id: SessionId,
        peer: PeerIdentity,
        origin: ConnectionOrigin,
        connected_at: DateTime<Utc>,
    },
    /// A connect (or redial) attempt ended without a link. Never retried automatically.
    ConnectFailed {
        peer: Option<PeerIdentity>,
        error: LinkError,
    },
    LinkLost {
        session_id: SessionId,
        peer: PeerIdentity,
        reason: LinkLossReason,
    },
    Inbound {
        session_id: SessionId,
        message: InboundMessage,
    },
    /// A record could not be parsed; it was dropped.
    MalformedRecord {
        session_id: SessionId,
        record: String,
        reason: String,
    },
    /// The robot reported `STOP`; any run toggle should go back to "start".
    RunModeReset,
}
