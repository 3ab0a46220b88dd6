//! Wrapped Token Module
//!
//! A 1:1 wrapper over an external fungible asset where every
//! transfer-affecting operation is gated by the whitelist aggregator.
//!
//! # Features
//!
//! - Deposit/withdraw against the base asset balance held by the token
//! - ERC20-style balances, allowances and transfers
//! - Pre-operation whitelist hook (skippable by unbinding the aggregator)
//! - Owner-controlled pause circuit breaker

mod base;
mod error;
mod wrapped;

pub use base::{AssetError, FungibleAsset};
pub use error::TokenError;
pub use wrapped::WrappedToken;
