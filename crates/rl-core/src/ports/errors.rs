use thiserror::Error;

/// Failure reported by a transport adapter.
///
/// Cloneable so attempt histories can be kept in [`crate::link::NegotiationFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("endpoint closed")]
    Closed,

    #[error("operation timed out")]
    Timeout,

    #[error("connection refused: {0}")]
    Refused(String),

    #[error("transport unavailable: {0}")]
    Unavailable(String),

    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::ConnectionRefused => TransportError::Refused(err.to_string()),
            ErrorKind::TimedOut => TransportError::Timeout,
            ErrorKind::NotConnected | ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => {
                TransportError::Closed
            }
            _ => TransportError::Io(err.to_string()),
        }
    }
}
