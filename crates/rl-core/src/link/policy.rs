use std::time::Duration;

/// How the session manager recovers after an established link drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// Open a listening endpoint and wait for the peer to call back in.
    #[default]
    Passive,
    /// Re-run negotiation against the last connected peer.
    ActiveRedial {
        max_rounds: u32,
        round_delay: Duration,
    },
}
