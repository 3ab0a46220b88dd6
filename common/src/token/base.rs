//! Base asset boundary
//!
//! The wrapped token consumes the underlying asset exclusively through this
//! interface; its accounting lives outside the subsystem.

use thiserror::Error;

use crate::crypto::Address;

/// Errors surfaced by a base asset implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: u64, required: u64 },
    #[error("Insufficient allowance: available {available}, required {required}")]
    InsufficientAllowance { available: u64, required: u64 },
    #[error("Arithmetic overflow during balance calculation")]
    Overflow,
}

/// Standard fungible-asset interface consumed by the wrapped token.
///
/// `caller` is always the identity performing the call; implementations
/// enforce their own balance and allowance rules and are expected to either
/// apply an operation fully or fail without side effects.
pub trait FungibleAsset: Send + Sync {
    fn name(&self) -> String;

    fn symbol(&self) -> String;

    fn decimals(&self) -> u8;

    fn balance_of(&self, account: &Address) -> u64;

    fn allowance(&self, owner: &Address, spender: &Address) -> u64;

    fn transfer(&self, caller: &Address, to: &Address, amount: u64) -> Result<(), AssetError>;

    fn transfer_from(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), AssetError>;

    fn approve(&self, caller: &Address, spender: &Address, amount: u64)
        -> Result<(), AssetError>;
}
