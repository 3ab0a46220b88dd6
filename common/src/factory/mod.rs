//! Wrapped Token Factory
//!
//! Deploys the shared whitelist aggregator (with its default static
//! controller) once at construction, then stamps out wrapped-token
//! instances that are pre-wired to the shared aggregator. The factory keeps
//! the implementation template and aggregator references that new
//! deployments use; both are owner-updatable and never zero. Updating them
//! only affects subsequent deployments - live tokens keep their bindings
//! unless individually reconfigured.

mod events;

pub use events::FactoryEvent;

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::crypto::Address;
use crate::registry::Registry;
use crate::time::{Clock, SystemClock};
use crate::token::{FungibleAsset, TokenError, WrappedToken};
use crate::whitelist::{StaticWhitelistController, WhitelistControllerAggregator, WhitelistError};

/// Errors raised by the factory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    #[error("Not authorized")]
    Unauthorized,
    #[error("Address cannot be zero")]
    InvalidAddress,
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    #[error("Whitelist error: {0}")]
    Whitelist(#[from] WhitelistError),
}

struct FactoryState {
    owner: Address,
    implementation: Address,
    aggregator: Address,
    // Salt for the next derived component address
    next_salt: u64,
    events: Vec<FactoryEvent>,
}

pub struct WrappedTokenFactory {
    address: Address,
    proxy_admin_owner: Address,
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
    // The static controller deployed at construction; stays index 0 of the
    // shared aggregator until explicitly removed
    default_controller: Arc<StaticWhitelistController>,
    state: RwLock<FactoryState>,
}

impl WrappedTokenFactory {
    /// Construct the factory as `deployer`, on the system clock.
    ///
    /// Deploys and initializes the shared aggregator (default controller
    /// included), hands its ownership to the deployer and seeds the factory
    /// as a caller admin so that deployed tokens can be authorized to query.
    pub fn new(deployer: &Address, proxy_admin_owner: &Address) -> Result<Self, FactoryError> {
        Self::with_clock(deployer, proxy_admin_owner, Arc::new(SystemClock))
    }

    /// Same as `new`, with an injected clock (deterministic tests)
    pub fn with_clock(
        deployer: &Address,
        proxy_admin_owner: &Address,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, FactoryError> {
        if proxy_admin_owner.is_zero() {
            return Err(FactoryError::InvalidAddress);
        }

        let address = Address::derive(deployer, 0);
        let registry = Arc::new(Registry::new());

        // Salt 1 = implementation template, 2 = aggregator, 3 = default
        // controller; deployed tokens continue from 4.
        let implementation = Address::derive(&address, 1);
        let aggregator_address = Address::derive(&address, 2);
        let controller_address = Address::derive(&address, 3);

        let aggregator = Arc::new(WhitelistControllerAggregator::new(
            aggregator_address.clone(),
            registry.clone(),
        ));
        registry.register_aggregator(aggregator.clone());

        // The constructor runs with the deployer's identity, so the
        // owner-gated seeding below is performed before anything else can
        // observe the aggregator.
        let default_controller = aggregator.initialize(deployer, controller_address)?;
        aggregator.set_caller_admin(deployer, &address, true)?;

        log::info!(
            "wrapped token factory {} deployed by {}: aggregator {}, implementation {}",
            address,
            deployer,
            aggregator_address,
            implementation
        );

        Ok(Self {
            address,
            proxy_admin_owner: proxy_admin_owner.clone(),
            registry,
            clock,
            default_controller,
            state: RwLock::new(FactoryState {
                owner: deployer.clone(),
                implementation,
                aggregator: aggregator_address,
                next_salt: 4,
                events: Vec::new(),
            }),
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn proxy_admin_owner(&self) -> &Address {
        &self.proxy_admin_owner
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The static controller deployed at construction
    pub fn default_controller(&self) -> &Arc<StaticWhitelistController> {
        &self.default_controller
    }

    pub fn owner(&self) -> Address {
        self.state.read().owner.clone()
    }

    pub fn implementation(&self) -> Address {
        self.state.read().implementation.clone()
    }

    pub fn whitelist_controller_aggregator(&self) -> Address {
        self.state.read().aggregator.clone()
    }

    pub fn transfer_ownership(
        &self,
        caller: &Address,
        new_owner: &Address,
    ) -> Result<(), FactoryError> {
        if new_owner.is_zero() {
            return Err(FactoryError::InvalidAddress);
        }
        let mut state = self.state.write();
        if &state.owner != caller {
            return Err(FactoryError::Unauthorized);
        }
        state.owner = new_owner.clone();
        Ok(())
    }

    /// Deploy a wrapped-token instance for `base_asset`.
    ///
    /// The instance is initialized against the factory's current aggregator
    /// and implementation references, granted authorized-caller status on
    /// the aggregator, and its ownership is handed to `new_owner`.
    pub fn deploy_wrapped_token(
        &self,
        caller: &Address,
        base_asset: Arc<dyn FungibleAsset>,
        new_owner: &Address,
    ) -> Result<Arc<WrappedToken>, FactoryError> {
        if new_owner.is_zero() {
            return Err(FactoryError::InvalidAddress);
        }

        let (token_address, implementation, aggregator_address) = {
            let mut state = self.state.write();
            if &state.owner != caller {
                return Err(FactoryError::Unauthorized);
            }
            let salt = state.next_salt;
            state.next_salt += 1;
            (
                Address::derive(&self.address, salt),
                state.implementation.clone(),
                state.aggregator.clone(),
            )
        };

        let token = Arc::new(WrappedToken::new(
            token_address.clone(),
            self.registry.clone(),
            self.clock.clone(),
        ));
        token.initialize(
            &self.address,
            base_asset,
            Some(aggregator_address.clone()),
            implementation,
        )?;

        // Authorize the new token as an aggregator caller. A replaced or
        // unresolvable aggregator reference must not block deployment:
        // misconfiguration stays a query-time failure on the token itself.
        match self.registry.aggregator(&aggregator_address) {
            Some(aggregator) => {
                if let Err(e) = aggregator.set_caller(&self.address, token.address(), true) {
                    log::warn!(
                        "factory {}: could not authorize token {} on aggregator {}: {}",
                        self.address,
                        token.address(),
                        aggregator_address,
                        e
                    );
                }
            }
            None => log::warn!(
                "factory {}: aggregator {} is not resolvable, token {} deployed unauthorized",
                self.address,
                aggregator_address,
                token.address()
            ),
        }

        token.transfer_ownership(&self.address, new_owner)?;

        let symbol = token.symbol();
        let mut state = self.state.write();
        state.events.push(FactoryEvent::TokenDeployed {
            token: token_address.clone(),
            symbol,
        });
        log::info!(
            "factory {}: deployed wrapped token {} for owner {}",
            self.address,
            token_address,
            new_owner
        );
        Ok(token)
    }

    /// Point subsequent deployments at a new token implementation
    pub fn update_implementation(
        &self,
        caller: &Address,
        implementation: &Address,
    ) -> Result<(), FactoryError> {
        if implementation.is_zero() {
            return Err(FactoryError::InvalidAddress);
        }
        let mut state = self.state.write();
        if &state.owner != caller {
            return Err(FactoryError::Unauthorized);
        }
        state.implementation = implementation.clone();
        state.events.push(FactoryEvent::NewImplementation {
            implementation: implementation.clone(),
        });
        log::info!(
            "factory {}: implementation updated to {}",
            self.address,
            implementation
        );
        Ok(())
    }

    /// Point subsequent deployments at a new controller aggregator
    pub fn update_controller(
        &self,
        caller: &Address,
        aggregator: &Address,
    ) -> Result<(), FactoryError> {
        if aggregator.is_zero() {
            return Err(FactoryError::InvalidAddress);
        }
        let mut state = self.state.write();
        if &state.owner != caller {
            return Err(FactoryError::Unauthorized);
        }
        state.aggregator = aggregator.clone();
        state.events.push(FactoryEvent::NewController {
            controller: aggregator.clone(),
        });
        log::info!(
            "factory {}: controller aggregator updated to {}",
            self.address,
            aggregator
        );
        Ok(())
    }

    /// Hand out accumulated events, clearing the log
    pub fn drain_events(&self) -> Vec<FactoryEvent> {
        std::mem::take(&mut self.state.write().events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::AssetError;

    struct NamedAsset {
        name: String,
        symbol: String,
    }

    impl NamedAsset {
        fn new(name: &str, symbol: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                symbol: symbol.to_string(),
            })
        }
    }

    // Factory tests never move balances; only the metadata surface matters
    impl FungibleAsset for NamedAsset {
        fn name(&self) -> String {
            self.name.clone()
        }

        fn symbol(&self) -> String {
            self.symbol.clone()
        }

        fn decimals(&self) -> u8 {
            18
        }

        fn balance_of(&self, _account: &Address) -> u64 {
            0
        }

        fn allowance(&self, _owner: &Address, _spender: &Address) -> u64 {
            0
        }

        fn transfer(&self, _caller: &Address, _to: &Address, _amount: u64) -> Result<(), AssetError> {
            Ok(())
        }

        fn transfer_from(
            &self,
            _caller: &Address,
            _from: &Address,
            _to: &Address,
            _amount: u64,
        ) -> Result<(), AssetError> {
            Ok(())
        }

        fn approve(
            &self,
            _caller: &Address,
            _spender: &Address,
            _amount: u64,
        ) -> Result<(), AssetError> {
            Ok(())
        }
    }

    fn factory(owner: &Address) -> WrappedTokenFactory {
        WrappedTokenFactory::new(owner, owner).unwrap()
    }

    #[test]
    fn constructor_rejects_zero_proxy_admin_owner() {
        let owner = Address::random();
        assert!(matches!(
            WrappedTokenFactory::new(&owner, &Address::zero()),
            Err(FactoryError::InvalidAddress)
        ));
    }

    #[test]
    fn constructor_sets_owner_to_deployer() {
        let owner = Address::random();
        let factory = factory(&owner);
        assert_eq!(factory.owner(), owner);
    }

    #[test]
    fn constructor_deploys_aggregator_with_default_controller() {
        let owner = Address::random();
        let factory = factory(&owner);

        let aggregator = factory
            .registry()
            .aggregator(&factory.whitelist_controller_aggregator())
            .unwrap();
        assert_eq!(aggregator.owner(), Some(owner.clone()));
        assert_eq!(aggregator.len(), 1);
        assert_eq!(
            aggregator.controller_at(0).ok().as_ref(),
            Some(factory.default_controller().address())
        );

        // Fresh controller: owned by the deployer, empty membership
        assert_eq!(factory.default_controller().owner(), Some(owner.clone()));
        assert!(!factory.default_controller().contains(&owner));
    }

    #[test]
    fn deploy_requires_owner() {
        let owner = Address::random();
        let actor = Address::random();
        let factory = factory(&owner);
        factory.transfer_ownership(&owner, &actor).unwrap();

        assert_eq!(
            factory
                .deploy_wrapped_token(&owner, NamedAsset::new("Token Name", "TOK"), &owner)
                .err(),
            Some(FactoryError::Unauthorized)
        );
    }

    #[test]
    fn deploy_hands_ownership_to_requested_owner() {
        let owner = Address::random();
        let factory = factory(&owner);
        let token = factory
            .deploy_wrapped_token(&owner, NamedAsset::new("Token Name", "TOK"), &owner)
            .unwrap();
        assert_eq!(token.owner(), Some(owner));
    }

    #[test]
    fn deploy_rejects_zero_owner() {
        let owner = Address::random();
        let factory = factory(&owner);
        assert_eq!(
            factory
                .deploy_wrapped_token(&owner, NamedAsset::new("Token Name", "TOK"), &Address::zero())
                .err(),
            Some(FactoryError::InvalidAddress)
        );
    }

    #[test]
    fn deploy_binds_shared_aggregator_and_authorizes_token() {
        let owner = Address::random();
        let factory = factory(&owner);
        let token = factory
            .deploy_wrapped_token(&owner, NamedAsset::new("Token Name", "TOK"), &owner)
            .unwrap();

        assert_eq!(
            token.whitelist_controller_aggregator(),
            Some(factory.whitelist_controller_aggregator())
        );
        let aggregator = factory
            .registry()
            .aggregator(&factory.whitelist_controller_aggregator())
            .unwrap();
        assert!(aggregator.is_authorized_caller(token.address()));
    }

    #[test]
    fn deploy_derives_prefixed_name_and_symbol() {
        let owner = Address::random();
        let factory = factory(&owner);
        let token = factory
            .deploy_wrapped_token(&owner, NamedAsset::new("Token Name", "TOK"), &owner)
            .unwrap();
        assert_eq!(token.name(), "Wrapped Token Name");
        assert_eq!(token.symbol(), "wTOK");
        assert_eq!(token.implementation(), factory.implementation());
    }

    #[test]
    fn deployed_tokens_get_distinct_addresses() {
        let owner = Address::random();
        let factory = factory(&owner);
        let asset = NamedAsset::new("Token Name", "TOK");
        let first = factory
            .deploy_wrapped_token(&owner, asset.clone(), &owner)
            .unwrap();
        let second = factory.deploy_wrapped_token(&owner, asset, &owner).unwrap();
        assert_ne!(first.address(), second.address());
    }

    #[test]
    fn update_implementation_rejects_zero() {
        let owner = Address::random();
        let factory = factory(&owner);
        assert_eq!(
            factory.update_implementation(&owner, &Address::zero()),
            Err(FactoryError::InvalidAddress)
        );
    }

    #[test]
    fn update_implementation_requires_owner() {
        let owner = Address::random();
        let actor = Address::random();
        let factory = factory(&owner);
        factory.transfer_ownership(&owner, &actor).unwrap();
        assert_eq!(
            factory.update_implementation(&owner, &Address::random()),
            Err(FactoryError::Unauthorized)
        );
    }

    #[test]
    fn update_implementation_applies_and_emits() {
        let owner = Address::random();
        let factory = factory(&owner);
        let implementation = Address::random();
        factory.drain_events();

        factory.update_implementation(&owner, &implementation).unwrap();
        assert_eq!(factory.implementation(), implementation);
        assert_eq!(
            factory.drain_events(),
            vec![FactoryEvent::NewImplementation { implementation }]
        );
    }

    #[test]
    fn update_controller_rejects_zero() {
        let owner = Address::random();
        let factory = factory(&owner);
        assert_eq!(
            factory.update_controller(&owner, &Address::zero()),
            Err(FactoryError::InvalidAddress)
        );
    }

    #[test]
    fn update_controller_applies_and_emits() {
        let owner = Address::random();
        let factory = factory(&owner);
        let controller = Address::random();
        factory.drain_events();

        factory.update_controller(&owner, &controller).unwrap();
        assert_eq!(factory.whitelist_controller_aggregator(), controller);
        assert_eq!(
            factory.drain_events(),
            vec![FactoryEvent::NewController { controller }]
        );
    }

    #[test]
    fn controller_update_only_affects_later_deployments() {
        let owner = Address::random();
        let factory = factory(&owner);
        let asset = NamedAsset::new("Token Name", "TOK");

        let original_aggregator = factory.whitelist_controller_aggregator();
        let before = factory
            .deploy_wrapped_token(&owner, asset.clone(), &owner)
            .unwrap();

        let replacement = Address::random();
        factory.update_controller(&owner, &replacement).unwrap();
        let after = factory.deploy_wrapped_token(&owner, asset, &owner).unwrap();

        assert_eq!(
            before.whitelist_controller_aggregator(),
            Some(original_aggregator)
        );
        assert_eq!(after.whitelist_controller_aggregator(), Some(replacement));
    }

    #[test]
    fn deploy_emits_token_deployed_event() {
        let owner = Address::random();
        let factory = factory(&owner);
        let token = factory
            .deploy_wrapped_token(&owner, NamedAsset::new("Token Name", "TOK"), &owner)
            .unwrap();

        let events = factory.drain_events();
        assert!(events.contains(&FactoryEvent::TokenDeployed {
            token: token.address().clone(),
            symbol: "wTOK".to_string(),
        }));
    }
}
