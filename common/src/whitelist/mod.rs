//! Whitelist Aggregation Protocol
//!
//! This module decides, per address, whether that address may currently hold
//! or move the wrapped asset.
//!
//! # Features
//!
//! - Single-query controller contract (`WhitelistController`)
//! - Static membership controller with idempotent add/remove
//! - Credential-window controller driven by an external credentials oracle
//! - Aggregator combining any number of controllers with logical OR
//! - Two-tier caller authorization (owner / caller-admin / authorized-caller)
//! - Swap-and-pop controller registry maintenance

mod aggregator;
mod controller;
mod credential;
mod error;
mod events;

pub use aggregator::WhitelistControllerAggregator;
pub use controller::StaticWhitelistController;
pub use credential::{CredentialWindowController, CredentialsSource, PolicySource};
pub use error::WhitelistError;
pub use events::AggregatorEvent;

use crate::crypto::Address;
use crate::time::TimestampSeconds;

/// Context attached to every whitelist query.
///
/// `caller` is the identity performing the query (controllers that gate
/// their query surface check it), `now` anchors freshness-window decisions.
#[derive(Clone, Debug)]
pub struct WhitelistQuery {
    pub caller: Address,
    pub now: TimestampSeconds,
}

impl WhitelistQuery {
    pub fn new(caller: Address, now: TimestampSeconds) -> Self {
        Self { caller, now }
    }
}

/// A single backend able to answer "is this address whitelisted".
///
/// The contract is intentionally minimal so new controller kinds plug into
/// the aggregator without aggregator changes.
pub trait WhitelistController: Send + Sync {
    /// The controller's own address handle
    fn address(&self) -> &Address;

    /// Whether `subject` is currently whitelisted according to this backend
    fn is_whitelisted(
        &self,
        query: &WhitelistQuery,
        subject: &Address,
    ) -> Result<bool, WhitelistError>;
}
