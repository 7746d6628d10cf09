//! Peer identity as observed on the radio link.
//! 无线链路上观察到的对端身份。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable radio address of a peer, e.g. `00:1A:7D:DA:71:13`.
///
/// Addresses are normalized (trimmed, ASCII upper-case) so that the same
/// hardware address reported by discovery and by an inbound accept compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PeerAddress(String);

impl PeerAddress {
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(address.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PeerAddress {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for PeerAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<PeerAddress> for String {
    fn from(value: PeerAddress) -> Self {
        value.0
    }
}

/// A remote robot-side controller.
///
/// The address is the identity key; the human readable name may be unavailable
/// (e.g. the peer was accepted before its name was ever resolved). Equality and
/// hashing only consider the address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerIdentity {
    pub address: PeerAddress,
    pub name: Option<String>,
}

impl PeerIdentity {
    pub fn new(address: impl Into<PeerAddress>, name: Option<String>) -> Self {
        Self {
            address: address.into(),
            name: name.filter(|n| !n.trim().is_empty()),
        }
    }

    /// Identity known only by address.
    pub fn anonymous(address: impl Into<PeerAddress>) -> Self {
        Self::new(address, None)
    }

    /// Name for display, falling back to the address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.address.as_str())
    }
}

impl PartialEq for PeerIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for PeerIdentity {}

impl Hash for PeerIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} ({})", self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn address_is_normalized() {
        let a = PeerAddress::new(" 00:1a:7d:da:71:13 ");
        assert_eq!(a.as_str(), "00:1A:7D:DA:71:13");
        assert_eq!(a, PeerAddress::from("00:1A:7D:DA:71:13"));
    }

    #[test]
    fn identity_equality_ignores_name() {
        let named = PeerIdentity::new("AA:BB", Some("MDP-Robot".to_string()));
        let anonymous = PeerIdentity::anonymous("aa:bb");
        assert_eq!(named, anonymous);

        let mut set = HashSet::new();
        set.insert(named);
        assert!(set.contains(&anonymous));
    }

    #[test]
    fn blank_name_is_treated_as_unavailable() {
        let peer = PeerIdentity::new("AA:BB", Some("   ".to_string()));
        assert!(peer.name.is_none());
        assert_eq!(peer.display_name(), "AA:BB");
    }

    #[test]
    fn address_serializes_as_plain_string() {
        let json = serde_json::to_string(&PeerAddress::new("aa:bb")).unwrap();
        assert_eq!(json, "\"AA:BB\"");
        let back: PeerAddress = serde_json::from_str("\"cc:dd\"").unwrap();
        assert_eq!(back.as_str(), "CC:DD");
    }
}
