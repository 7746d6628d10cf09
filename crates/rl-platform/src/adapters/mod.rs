//! Port adapters.

mod adapter_state;
mod bonding;
mod discovery;
mod link_events;
mod stream_endpoint;
mod tcp_connector;
mod tcp_listener;

pub use adapter_state::HostAdapterState;
pub use bonding::{TrustStore, TrustStoreBonding};
pub use discovery::ConfiguredDiscovery;
pub use link_events::LinkEventHub;
pub use stream_endpoint::StreamEndpoint;
pub use tcp_connector::{TcpChannelConnector, TcpChannelHandle};
pub use tcp_listener::{TcpListenerPort, TcpListeningEndpoint};
