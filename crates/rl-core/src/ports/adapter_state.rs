use crate::link::AdapterAvailability;

/// Host radio adapter status, checked before every connect request.
pub trait AdapterStatePort: Send + Sync {
    fn availability(&self) -> AdapterAvailability;

    fn connect_permission_granted(&self) -> bool;
}
