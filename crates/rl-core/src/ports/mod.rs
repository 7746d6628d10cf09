//! Port interfaces for the application layer
//!
//! Ports define the contract between link orchestration and the radio
//! stack. The platform crate implements them; `rl-app` only ever sees the
//! traits, so every transition can be tested against in-memory fakes.

mod adapter_state;
mod bonding;
mod discovery;
pub mod errors;
mod link_events;
mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod mocks;

pub use adapter_state::AdapterStatePort;
pub use bonding::BondingPort;
pub use discovery::{DiscoveryEvent, DiscoveryPort};
pub use errors::TransportError;
pub use link_events::LinkEventPort;
pub use transport::{
    ChannelConnector, ChannelHandle, ListenerPort, ListeningEndpoint, TransportEndpoint,
};
