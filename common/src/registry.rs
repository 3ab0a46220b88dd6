//! Component Registry
//!
//! Address to component resolution for the whitelist subsystem. References
//! held by the aggregator, the factory and deployed tokens are plain
//! addresses; the registry is the only place they are turned back into live
//! components. An address that was never registered (or whose component was
//! dropped) stays resolvable as `None` and surfaces at query time, not at
//! the time the reference was stored.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::crypto::Address;
use crate::whitelist::{WhitelistController, WhitelistControllerAggregator};

#[derive(Default)]
pub struct Registry {
    controllers: RwLock<HashMap<Address, Arc<dyn WhitelistController>>>,
    aggregators: RwLock<HashMap<Address, Arc<WhitelistControllerAggregator>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller under its own address, replacing any previous
    /// registration for that address.
    pub fn register_controller(&self, controller: Arc<dyn WhitelistController>) {
        let address = controller.address().clone();
        log::debug!("registering whitelist controller at {}", address);
        self.controllers.write().insert(address, controller);
    }

    pub fn controller(&self, address: &Address) -> Option<Arc<dyn WhitelistController>> {
        self.controllers.read().get(address).cloned()
    }

    pub fn register_aggregator(&self, aggregator: Arc<WhitelistControllerAggregator>) {
        let address = aggregator.address().clone();
        log::debug!("registering whitelist aggregator at {}", address);
        self.aggregators.write().insert(address, aggregator);
    }

    pub fn aggregator(&self, address: &Address) -> Option<Arc<WhitelistControllerAggregator>> {
        self.aggregators.read().get(address).cloned()
    }
}
