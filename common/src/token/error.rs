use thiserror::Error;

use crate::crypto::Address;
use crate::token::AssetError;
use crate::whitelist::WhitelistError;

/// Errors raised by the wrapped token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Not authorized")]
    Unauthorized,
    #[error("Already initialized")]
    AlreadyInitialized,
    #[error("Token is paused")]
    Paused,
    #[error("Address {0} is not whitelisted")]
    NotWhitelisted(Address),
    #[error("Address cannot be zero")]
    InvalidAddress,
    #[error("Whitelist aggregator at {0} is not available")]
    AggregatorUnavailable(Address),
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: u64, required: u64 },
    #[error("Insufficient allowance: available {available}, required {required}")]
    InsufficientAllowance { available: u64, required: u64 },
    #[error("Arithmetic overflow during balance calculation")]
    Overflow,
    #[error("Whitelist error: {0}")]
    Whitelist(#[from] WhitelistError),
    #[error("Base asset error: {0}")]
    Asset(#[from] AssetError),
}
