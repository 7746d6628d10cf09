//! Link session domain types: connection state, channel strategies,
//! reconnection policy, session events and the surfaced error taxonomy.

pub mod error;
pub mod event;
pub mod policy;
pub mod state;
pub mod strategy;

pub use error::{AdapterAvailability, AttemptFailure, LinkError, NegotiationFailed, PairingError};
pub use event::{ConnectionOrigin, LinkLayerEvent, LinkLossReason, SendOutcome, SessionEvent};
pub use policy::ReconnectPolicy;
pub use state::LinkState;
pub use strategy::{ChannelStrategy, ServiceRecord, DEFAULT_FIXED_CHANNEL, DEFAULT_SERVICE_NAME, SPP_SERVICE_UUID};
