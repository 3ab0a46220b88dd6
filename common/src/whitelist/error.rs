use thiserror::Error;

use crate::crypto::Address;

/// Errors raised by whitelist controllers and the aggregator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WhitelistError {
    #[error("Not authorized")]
    Unauthorized,
    #[error("Already initialized")]
    AlreadyInitialized,
    #[error("Controller index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("Address cannot be zero")]
    InvalidAddress,
    #[error("Controller at {0} is not available")]
    ControllerUnavailable(Address),
}
