//! In-memory stand-ins for the subsystem's external collaborators

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use wrapmint_common::crypto::Address;
use wrapmint_common::time::TimestampSeconds;
use wrapmint_common::token::{AssetError, FungibleAsset};
use wrapmint_common::whitelist::{CredentialsSource, PolicySource};

/// Mintable in-memory fungible asset
pub struct MockAsset {
    name: String,
    symbol: String,
    decimals: u8,
    balances: RwLock<HashMap<Address, u64>>,
    allowances: RwLock<HashMap<(Address, Address), u64>>,
}

impl MockAsset {
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            balances: RwLock::new(HashMap::new()),
            allowances: RwLock::new(HashMap::new()),
        })
    }

    /// Credit `amount` to `account` out of thin air
    pub fn mint(&self, account: &Address, amount: u64) {
        *self.balances.write().entry(account.clone()).or_insert(0) += amount;
    }
}

impl FungibleAsset for MockAsset {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn symbol(&self) -> String {
        self.symbol.clone()
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn balance_of(&self, account: &Address) -> u64 {
        self.balances.read().get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.allowances
            .read()
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&self, caller: &Address, to: &Address, amount: u64) -> Result<(), AssetError> {
        let mut balances = self.balances.write();
        let balance = balances.get(caller).copied().unwrap_or(0);
        if balance < amount {
            return Err(AssetError::InsufficientBalance {
                available: balance,
                required: amount,
            });
        }
        balances.insert(caller.clone(), balance - amount);
        *balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }

    fn transfer_from(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), AssetError> {
        let key = (from.clone(), caller.clone());
        let allowance = self.allowances.read().get(&key).copied().unwrap_or(0);
        if allowance < amount {
            return Err(AssetError::InsufficientAllowance {
                available: allowance,
                required: amount,
            });
        }
        self.transfer(from, to, amount)?;
        self.allowances.write().insert(key, allowance - amount);
        Ok(())
    }

    fn approve(&self, caller: &Address, spender: &Address, amount: u64) -> Result<(), AssetError> {
        self.allowances
            .write()
            .insert((caller.clone(), spender.clone()), amount);
        Ok(())
    }
}

/// Settable credential registry: last update time per subject (0 = never)
#[derive(Default)]
pub struct MockCredentials {
    updates: RwLock<HashMap<Address, TimestampSeconds>>,
}

impl MockCredentials {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_last_update(&self, subject: &Address, timestamp: TimestampSeconds) {
        self.updates.write().insert(subject.clone(), timestamp);
    }

    pub fn clear(&self, subject: &Address) {
        self.updates.write().remove(subject);
    }
}

impl CredentialsSource for MockCredentials {
    fn last_update(&self, subject: &Address) -> TimestampSeconds {
        self.updates.read().get(subject).copied().unwrap_or(0)
    }
}

/// Settable TTL policy source
pub struct MockPolicy {
    ttl: RwLock<u64>,
}

impl MockPolicy {
    pub fn new(ttl: u64) -> Arc<Self> {
        Arc::new(Self {
            ttl: RwLock::new(ttl),
        })
    }

    pub fn set_ttl(&self, ttl: u64) {
        *self.ttl.write() = ttl;
    }
}

impl PolicySource for MockPolicy {
    fn ttl(&self) -> u64 {
        *self.ttl.read()
    }
}
