use super::model::*;
use crate::link::{DEFAULT_FIXED_CHANNEL, DEFAULT_SERVICE_NAME, SPP_SERVICE_UUID};

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            service_uuid: SPP_SERVICE_UUID,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            fixed_channel: DEFAULT_FIXED_CHANNEL,
            attempt_timeout_secs: 10,
            accept_timeout_secs: 300,
            accept_retry_delay_ms: 1000,
            write_timeout_secs: 5,
            pairing_timeout_secs: 120,
            reconnect: ReconnectSettings::default(),
        }
    }
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            policy: ReconnectPolicyKind::Passive,
            max_rounds: 3,
            round_delay_secs: 2,
        }
    }
}

impl Default for RadioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            connect_permission: true,
            listen_address: "127.0.0.1:7100".to_string(),
            auto_accept_pairing: true,
            pairing_delay_ms: 500,
        }
    }
}
