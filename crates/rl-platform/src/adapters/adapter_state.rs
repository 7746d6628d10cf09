use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use rl_core::config::RadioSettings;
use rl_core::link::AdapterAvailability;
use rl_core::ports::AdapterStatePort;

/// Host adapter status held in memory; toggled from the console or tests.
#[derive(Debug)]
pub struct HostAdapterState {
    availability: AtomicU8,
    permission: AtomicBool,
}

impl HostAdapterState {
    pub fn new(availability: AdapterAvailability, permission: bool) -> Self {
        Self {
            availability: AtomicU8::new(encode(availability)),
            permission: AtomicBool::new(permission),
        }
    }

    pub fn from_settings(settings: &RadioSettings) -> Self {
        let availability = if settings.enabled {
            AdapterAvailability::Available
        } else {
            AdapterAvailability::PoweredOff
        };
        Self::new(availability, settings.connect_permission)
    }

    pub fn set_availability(&self, availability: AdapterAvailability) {
        self.availability
            .store(encode(availability), Ordering::SeqCst);
    }

    pub fn set_connect_permission(&self, granted: bool) {
        self.permission.store(granted, Ordering::SeqCst);
    }
}

fn encode(availability: AdapterAvailability) -> u8 {
    match availability {
        AdapterAvailability::Available => 0,
        AdapterAvailability::PoweredOff => 1,
        AdapterAvailability::Unsupported => 2,
    }
}

fn decode(value: u8) -> AdapterAvailability {
    match value {
        0 => AdapterAvailability::Available,
        1 => AdapterAvailability::PoweredOff,
        _ => AdapterAvailability::Unsupported,
    }
}

impl AdapterStatePort for HostAdapterState {
    fn availability(&self) -> AdapterAvailability {
        decode(self.availability.load(Ordering::SeqCst))
    }

    fn connect_permission_granted(&self) -> bool {
        self.permission.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_radio_reads_as_powered_off() {
        let settings = RadioSettings {
            enabled: false,
            ..RadioSettings::default()
        };
        let state = HostAdapterState::from_settings(&settings);
        assert_eq!(state.availability(), AdapterAvailability::PoweredOff);

        state.set_availability(AdapterAvailability::Unsupported);
        assert_eq!(state.availability(), AdapterAvailability::Unsupported);
        state.set_connect_permission(false);
        assert!(!state.connect_permission_granted());
    }
}
