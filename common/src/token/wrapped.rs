//! Wrapped token instance
//!
//! Wraps a base fungible asset 1:1. Deposits pull the base asset into the
//! token's own holdings and mint the same amount of wrapped balance;
//! withdrawals burn wrapped balance and pay the base asset back out. Every
//! transfer-affecting operation runs the whitelist hook first: mint checks
//! the recipient, burn checks the caller, a transfer checks both legs. An
//! unbound aggregator disables the hook entirely, making authorization
//! opt-in per deployment.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::crypto::Address;
use crate::registry::Registry;
use crate::time::Clock;
use crate::token::{FungibleAsset, TokenError};

struct TokenState {
    owner: Option<Address>,
    name: String,
    symbol: String,
    base_asset: Option<Arc<dyn FungibleAsset>>,
    aggregator: Option<Address>,
    implementation: Address,
    paused: bool,
    total_supply: u64,
    balances: HashMap<Address, u64>,
    allowances: HashMap<(Address, Address), u64>,
}

pub struct WrappedToken {
    address: Address,
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
    state: RwLock<TokenState>,
}

impl WrappedToken {
    /// Create an uninitialized instance at `address`.
    ///
    /// Instances are deployed from a shared template, so construction and
    /// setup are split: nothing works until `initialize` runs once.
    pub fn new(address: Address, registry: Arc<Registry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            address,
            registry,
            clock,
            state: RwLock::new(TokenState {
                owner: None,
                name: String::new(),
                symbol: String::new(),
                base_asset: None,
                aggregator: None,
                implementation: Address::zero(),
                paused: false,
                total_supply: 0,
                balances: HashMap::new(),
                allowances: HashMap::new(),
            }),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// One-time setup: binds the base asset and the aggregator reference,
    /// derives name and symbol from the base asset and makes the caller the
    /// owner.
    pub fn initialize(
        &self,
        caller: &Address,
        base_asset: Arc<dyn FungibleAsset>,
        aggregator: Option<Address>,
        implementation: Address,
    ) -> Result<(), TokenError> {
        let mut state = self.state.write();
        if state.base_asset.is_some() {
            return Err(TokenError::AlreadyInitialized);
        }

        state.name = format!("Wrapped {}", base_asset.name());
        state.symbol = format!("w{}", base_asset.symbol());
        state.owner = Some(caller.clone());
        state.base_asset = Some(base_asset);
        state.aggregator = aggregator;
        state.implementation = implementation;
        log::info!(
            "wrapped token {} initialized: {} ({}), owner {}",
            self.address,
            state.name,
            state.symbol,
            caller
        );
        Ok(())
    }

    pub fn name(&self) -> String {
        self.state.read().name.clone()
    }

    pub fn symbol(&self) -> String {
        self.state.read().symbol.clone()
    }

    /// Decimals of the base asset, not an own configuration
    pub fn decimals(&self) -> u8 {
        match &self.state.read().base_asset {
            Some(base) => base.decimals(),
            None => 0,
        }
    }

    pub fn total_supply(&self) -> u64 {
        self.state.read().total_supply
    }

    pub fn balance_of(&self, account: &Address) -> u64 {
        self.state
            .read()
            .balances
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.state
            .read()
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn owner(&self) -> Option<Address> {
        self.state.read().owner.clone()
    }

    pub fn paused(&self) -> bool {
        self.state.read().paused
    }

    pub fn implementation(&self) -> Address {
        self.state.read().implementation.clone()
    }

    pub fn whitelist_controller_aggregator(&self) -> Option<Address> {
        self.state.read().aggregator.clone()
    }

    pub fn transfer_ownership(
        &self,
        caller: &Address,
        new_owner: &Address,
    ) -> Result<(), TokenError> {
        if new_owner.is_zero() {
            return Err(TokenError::InvalidAddress);
        }
        let mut state = self.state.write();
        ensure_owner(&state.owner, caller)?;
        state.owner = Some(new_owner.clone());
        Ok(())
    }

    /// Owner-only circuit breaker: while paused, every transfer-affecting
    /// operation fails regardless of whitelist state.
    pub fn pause(&self, caller: &Address) -> Result<(), TokenError> {
        let mut state = self.state.write();
        ensure_owner(&state.owner, caller)?;
        state.paused = true;
        log::warn!("wrapped token {} paused", self.address);
        Ok(())
    }

    pub fn unpause(&self, caller: &Address) -> Result<(), TokenError> {
        let mut state = self.state.write();
        ensure_owner(&state.owner, caller)?;
        state.paused = false;
        log::info!("wrapped token {} unpaused", self.address);
        Ok(())
    }

    /// Rebind the aggregator reference; `None` disables whitelist checks
    pub fn set_whitelist_controller(
        &self,
        caller: &Address,
        aggregator: Option<Address>,
    ) -> Result<(), TokenError> {
        let mut state = self.state.write();
        ensure_owner(&state.owner, caller)?;
        log::info!(
            "wrapped token {}: whitelist controller set to {}",
            self.address,
            aggregator
                .as_ref()
                .map(|a| a.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        state.aggregator = aggregator;
        Ok(())
    }

    /// Wrap `amount` of the base asset for `account`.
    ///
    /// Pulls the base asset from the caller (prior allowance required) and
    /// mints the same amount of wrapped balance to `account`.
    pub fn deposit_for(
        &self,
        caller: &Address,
        account: &Address,
        amount: u64,
    ) -> Result<(), TokenError> {
        let mut state = self.state.write();
        self.check_transfer(&state, None, Some(account))?;
        let base = current_base(&state)?;

        let new_supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        base.transfer_from(caller, &self.address, amount)?;

        state.total_supply = new_supply;
        *state.balances.entry(account.clone()).or_insert(0) += amount;
        log::debug!(
            "wrapped token {}: {} deposited {} for {}",
            self.address,
            caller,
            amount,
            account
        );
        Ok(())
    }

    /// Unwrap `amount` from the caller's balance and pay the base asset out
    /// to `account`.
    pub fn withdraw_to(
        &self,
        caller: &Address,
        account: &Address,
        amount: u64,
    ) -> Result<(), TokenError> {
        let mut state = self.state.write();
        self.check_transfer(&state, Some(caller), None)?;
        let base = current_base(&state)?;

        let balance = state.balances.get(caller).copied().unwrap_or(0);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                available: balance,
                required: amount,
            });
        }
        base.transfer(&self.address, account, amount)?;

        state.balances.insert(caller.clone(), balance - amount);
        state.total_supply -= amount;
        log::debug!(
            "wrapped token {}: {} withdrew {} to {}",
            self.address,
            caller,
            amount,
            account
        );
        Ok(())
    }

    pub fn transfer(&self, caller: &Address, to: &Address, amount: u64) -> Result<(), TokenError> {
        let mut state = self.state.write();
        self.check_transfer(&state, Some(caller), Some(to))?;
        move_balance(&mut state, caller, to, amount)
    }

    /// Allowances are not transfer-affecting: neither pause nor whitelist
    /// state gates them.
    pub fn approve(
        &self,
        caller: &Address,
        spender: &Address,
        amount: u64,
    ) -> Result<(), TokenError> {
        let mut state = self.state.write();
        state
            .allowances
            .insert((caller.clone(), spender.clone()), amount);
        Ok(())
    }

    pub fn transfer_from(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), TokenError> {
        let mut state = self.state.write();
        self.check_transfer(&state, Some(from), Some(to))?;

        let key = (from.clone(), caller.clone());
        let allowance = state.allowances.get(&key).copied().unwrap_or(0);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                available: allowance,
                required: amount,
            });
        }
        move_balance(&mut state, from, to, amount)?;
        state.allowances.insert(key, allowance - amount);
        Ok(())
    }

    // Pre-operation hook shared by every transfer-affecting operation: the
    // pause breaker first, then one aggregator query per involved party.
    // The token queries with its own address as caller.
    fn check_transfer(
        &self,
        state: &TokenState,
        from: Option<&Address>,
        to: Option<&Address>,
    ) -> Result<(), TokenError> {
        if state.paused {
            return Err(TokenError::Paused);
        }
        let Some(aggregator_address) = &state.aggregator else {
            return Ok(());
        };
        let aggregator = self
            .registry
            .aggregator(aggregator_address)
            .ok_or_else(|| TokenError::AggregatorUnavailable(aggregator_address.clone()))?;

        let now = self.clock.now();
        for subject in [from, to].into_iter().flatten() {
            if aggregator
                .is_whitelisted(&self.address, subject, now)?
                .is_none()
            {
                return Err(TokenError::NotWhitelisted(subject.clone()));
            }
        }
        Ok(())
    }
}

fn current_base(state: &TokenState) -> Result<Arc<dyn FungibleAsset>, TokenError> {
    state.base_asset.clone().ok_or(TokenError::InvalidAddress)
}

fn ensure_owner(owner: &Option<Address>, caller: &Address) -> Result<(), TokenError> {
    match owner {
        Some(owner) if owner == caller => Ok(()),
        _ => Err(TokenError::Unauthorized),
    }
}

fn move_balance(
    state: &mut TokenState,
    from: &Address,
    to: &Address,
    amount: u64,
) -> Result<(), TokenError> {
    let balance = state.balances.get(from).copied().unwrap_or(0);
    if balance < amount {
        return Err(TokenError::InsufficientBalance {
            available: balance,
            required: amount,
        });
    }
    state.balances.insert(from.clone(), balance - amount);
    *state.balances.entry(to.clone()).or_insert(0) += amount;
    Ok(())
}
