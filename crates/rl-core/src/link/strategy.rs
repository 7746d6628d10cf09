use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Serial Port Profile service class UUID, used for both outbound lookups and
/// the inbound listening endpoint.
pub const SPP_SERVICE_UUID: Uuid = Uuid::from_u128(0x00001101_0000_1000_8000_00805F9B34FB);

/// Service name advertised by the listening endpoint.
pub const DEFAULT_SERVICE_NAME: &str = "MDP_Android";

/// Legacy channel the robot-side controller exposes directly.
pub const DEFAULT_FIXED_CHANNEL: u8 = 1;

/// Channel-establishment strategy tried by the negotiator.
///
/// The peer's service configuration is not knowable in advance, so several
/// strategies are attempted in a fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStrategy {
    /// Direct low-level open of a well-known channel number.
    FixedChannel(u8),
    /// Authenticated/encrypted channel found through a service-record lookup.
    SecureServiceRecord,
    /// Unauthenticated variant of the service-record lookup.
    InsecureServiceRecord,
}

impl ChannelStrategy {
    /// Negotiation order: fixed channel, secure lookup, insecure lookup.
    pub fn default_order(fixed_channel: u8) -> Vec<ChannelStrategy> {
        vec![
            ChannelStrategy::FixedChannel(fixed_channel),
            ChannelStrategy::SecureServiceRecord,
            ChannelStrategy::InsecureServiceRecord,
        ]
    }
}

impl fmt::Display for ChannelStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelStrategy::FixedChannel(n) => write!(f, "fixed channel {n}"),
            ChannelStrategy::SecureServiceRecord => f.write_str("secure service record"),
            ChannelStrategy::InsecureServiceRecord => f.write_str("insecure service record"),
        }
    }
}

/// Service record used for lookups and for the listening endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub uuid: Uuid,
    pub name: String,
}

impl Default for ServiceRecord {
    fn default() -> Self {
        Self {
            uuid: SPP_SERVICE_UUID,
            name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}
