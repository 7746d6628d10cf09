use std::time::Duration;

use rl_core::config::LinkSettings;
use rl_core::link::{ChannelStrategy, ReconnectPolicy, ServiceRecord};

/// Floor for the pause between listening endpoints, so a failing `listen`
/// cannot spin.
const MIN_ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Session manager tuning, derived from [`LinkSettings`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub strategies: Vec<ChannelStrategy>,
    pub attempt_timeout: Duration,
    pub pairing_timeout: Duration,
    pub service_record: ServiceRecord,
    pub accept_timeout: Duration,
    pub accept_retry_delay: Duration,
    pub write_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(&LinkSettings::default())
    }
}

impl SessionConfig {
    pub fn from_settings(settings: &LinkSettings) -> Self {
        Self {
            strategies: settings.strategies(),
            attempt_timeout: settings.attempt_timeout().max(Duration::from_millis(1)),
            pairing_timeout: settings.pairing_timeout().max(Duration::from_secs(1)),
            service_record: settings.service_record(),
            accept_timeout: settings.accept_timeout().max(Duration::from_secs(1)),
            accept_retry_delay: settings
                .accept_retry_delay()
                .max(MIN_ACCEPT_RETRY_DELAY),
            write_timeout: settings.write_timeout().max(Duration::from_secs(1)),
            reconnect: settings.reconnect_policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_link_settings() {
        let config = SessionConfig::default();
        assert_eq!(config.strategies, ChannelStrategy::default_order(1));
        assert_eq!(config.accept_timeout, Duration::from_secs(300));
        assert_eq!(config.accept_retry_delay, Duration::from_secs(1));
        assert_eq!(config.write_timeout, Duration::from_secs(5));
        assert_eq!(config.reconnect, ReconnectPolicy::Passive);
        assert_eq!(config.service_record.name, "MDP_Android");
    }

    #[test]
    fn zero_timeouts_are_clamped() {
        let settings = LinkSettings {
            attempt_timeout_secs: 0,
            accept_timeout_secs: 0,
            accept_retry_delay_ms: 0,
            write_timeout_secs: 0,
            ..LinkSettings::default()
        };
        let config = SessionConfig::from_settings(&settings);
        assert!(config.attempt_timeout > Duration::ZERO);
        assert!(config.accept_timeout > Duration::ZERO);
        assert_eq!(config.accept_retry_delay, MIN_ACCEPT_RETRY_DELAY);
        assert_eq!(config.write_timeout, Duration::from_secs(1));
    }
}
