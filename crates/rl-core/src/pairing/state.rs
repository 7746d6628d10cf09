use serde::{Deserialize, Serialize};
use std::fmt;

/// Trust (bond) state of a peer as reported by the radio stack.
/// 对端的配对（绑定）状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingState {
    /// No trust relationship; pairing must be initiated before connecting.
    Unpaired,
    /// A pairing exchange is in progress.
    Pairing,
    /// Trusted; channels can be opened.
    Paired,
}

impl PairingState {
    pub fn is_paired(self) -> bool {
        matches!(self, PairingState::Paired)
    }
}

impl fmt::Display for PairingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PairingState::Unpaired => "unpaired",
            PairingState::Pairing => "pairing",
            PairingState::Paired => "paired",
        };
        f.write_str(s)
    }
}
