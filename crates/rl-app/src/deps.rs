//! # Link Dependencies / 链路依赖
//!
//! Parameter grouping for [`LinkSessionManager`](crate::LinkSessionManager)
//! construction. Not a builder: no defaults, no hidden logic.

use std::sync::Arc;
use rl_core::ports::*;

/// Every port the session manager drives. All are required.
#[derive(Clone)]
pub struct LinkDeps {
    // Transport
    pub connector: Arc<dyn ChannelConnector>,
    pub listener: Arc<dyn ListenerPort>,

    // Radio stack
    pub discovery: Arc<dyn DiscoveryPort>,
    pub bonding: Arc<dyn BondingPort>,
    pub adapter: Arc<dyn AdapterStatePort>,
    pub link_events: Arc<dyn LinkEventPort>,
}
