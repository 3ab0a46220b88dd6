//! Deployed-system test bench
//!
//! Wires a factory, a base asset and one wrapped token on a manual clock,
//! with the deployer holding every administrative seat. Scenario tests
//! drive the bench the way an operator would drive the deployed system.

use std::sync::Arc;

use wrapmint_common::crypto::Address;
use wrapmint_common::factory::{FactoryError, WrappedTokenFactory};
use wrapmint_common::time::{ManualClock, TimestampSeconds};
use wrapmint_common::token::{FungibleAsset, TokenError, WrappedToken};
use wrapmint_common::whitelist::{
    StaticWhitelistController, WhitelistControllerAggregator, WhitelistError,
};

use crate::mocks::MockAsset;

/// Default bench genesis time (arbitrary fixed point, far from zero)
pub const GENESIS: TimestampSeconds = 1_700_000_000;

pub struct TestBench {
    pub owner: Address,
    pub clock: Arc<ManualClock>,
    pub factory: WrappedTokenFactory,
    pub base: Arc<MockAsset>,
    pub token: Arc<WrappedToken>,
}

impl TestBench {
    /// Deploy a complete system: factory, shared aggregator with default
    /// controller, one base asset ("Token Name"/"TOK", 18 decimals) and one
    /// wrapped token owned by the deployer.
    pub fn deploy() -> Result<Self, FactoryError> {
        let owner = Address::random();
        let clock = Arc::new(ManualClock::new(GENESIS));
        let factory = WrappedTokenFactory::with_clock(&owner, &owner, clock.clone())?;
        let base = MockAsset::new("Token Name", "TOK", 18);
        let token = factory.deploy_wrapped_token(&owner, base.clone(), &owner)?;
        log::debug!(
            "test bench deployed: owner {}, token {} ({})",
            owner,
            token.address(),
            token.symbol()
        );
        Ok(Self {
            owner,
            clock,
            factory,
            base,
            token,
        })
    }

    /// The shared aggregator instance
    pub fn aggregator(&self) -> Arc<WhitelistControllerAggregator> {
        self.factory
            .registry()
            .aggregator(&self.factory.whitelist_controller_aggregator())
            .expect("bench aggregator is always registered")
    }

    /// The default static controller (index 0 of the aggregator)
    pub fn controller(&self) -> &Arc<StaticWhitelistController> {
        self.factory.default_controller()
    }

    /// Whitelist `addresses` on the default controller
    pub fn whitelist(&self, addresses: &[Address]) -> Result<(), WhitelistError> {
        self.controller().add(&self.owner, addresses)
    }

    /// Grant `caller` direct query rights on the aggregator through the
    /// two-tier model (owner seats itself as caller admin on first use)
    pub fn authorize_caller(&self, caller: &Address) -> Result<(), WhitelistError> {
        let aggregator = self.aggregator();
        if !aggregator.is_caller_admin(&self.owner) {
            aggregator.set_caller_admin(&self.owner, &self.owner, true)?;
        }
        aggregator.set_caller(&self.owner, caller, true)
    }

    /// Mint `amount` of the base asset to `account` and wrap it
    pub fn deposit(&self, account: &Address, amount: u64) -> Result<(), TokenError> {
        self.base.mint(account, amount);
        self.base.approve(account, self.token.address(), amount)?;
        self.token.deposit_for(account, account, amount)
    }
}
