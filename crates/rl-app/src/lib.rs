//! RoboLink Application Orchestration Layer
//!
//! Drives the link to the robot: connection negotiation, pairing, the
//! session state machine with its read-loop and reconnection supervisor,
//! and dispatch of inbound protocol records to subscribers.

pub mod deps;
pub mod negotiator;
pub mod pairing_monitor;
pub mod session;

pub use deps::LinkDeps;
pub use negotiator::{ConnectionNegotiator, Negotiated};
pub use pairing_monitor::PairingMonitor;
pub use session::{LinkSessionManager, LinkStatus, SessionConfig};
