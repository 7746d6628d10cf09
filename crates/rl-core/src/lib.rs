//! # rl-core
//!
//! Core domain models and business logic for RoboLink.
//!
//! This crate contains pure business logic without any infrastructure dependencies:
//! peer identity, pairing and link state, the line-oriented robot protocol and the
//! port traits implemented by the platform layer.

// Public module exports
pub mod config;
pub mod ids;
pub mod link;
pub mod pairing;
pub mod peer;
pub mod ports;
pub mod protocol;

// Re-export commonly used types at the crate root
pub use config::RoboLinkConfig;
pub use ids::SessionId;
pub use link::{LinkError, LinkState, SendOutcome, SessionEvent};
pub use pairing::PairingState;
pub use peer::{PeerAddress, PeerIdentity};
pub use protocol::{InboundMessage, OutboundCommand};
