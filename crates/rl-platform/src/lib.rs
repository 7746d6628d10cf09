//! # rl-platform
//!
//! Platform implementations of the RoboLink ports.
//!
//! The radio stack is emulated over TCP: every fixed channel and service
//! record of a configured peer maps to a socket address, and the listening
//! endpoint is a TCP listener. Endpoints themselves are generic over any
//! tokio stream, so a real serial/RFCOMM socket plugs in the same way.

pub mod adapters;
pub mod directory;
pub mod hub;

pub use directory::PeerDirectory;
pub use hub::EventHub;
