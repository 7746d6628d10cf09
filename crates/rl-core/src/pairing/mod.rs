//! Pairing (bonding) domain: trust state of a peer and the single-peer pursuit
//! that resolves a pending pairing request.

pub mod event;
pub mod pursuit;
pub mod state;

pub use event::BondStateChanged;
pub use pursuit::{PairingPursuit, PursuitOutcome};
pub use state::PairingState;
