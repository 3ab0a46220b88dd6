//! Whitelist controller aggregator
//!
//! A dense, owner-managed collection of controller references combined with
//! logical OR, behind a two-tier caller-authorization model: the owner
//! manages caller admins, caller admins manage the set of addresses allowed
//! to run the whitelist query.
//!
//! Controller references are plain addresses resolved through the component
//! registry at query time. Adding a reference is never validated; a
//! reference that does not resolve fails the whole query, and an erroring
//! controller propagates its failure to the aggregator's caller.

use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::RwLock;

use crate::crypto::Address;
use crate::registry::Registry;
use crate::time::TimestampSeconds;
use crate::whitelist::{
    AggregatorEvent, StaticWhitelistController, WhitelistController, WhitelistError,
    WhitelistQuery,
};

struct AggregatorState {
    owner: Option<Address>,
    // Dense sequence: removal is swap-and-pop, so indices are not stable
    // across removals and index 0 holds the default controller until it is
    // explicitly removed.
    controllers: Vec<Address>,
    caller_admins: IndexSet<Address>,
    authorized_callers: IndexSet<Address>,
    events: Vec<AggregatorEvent>,
}

pub struct WhitelistControllerAggregator {
    address: Address,
    registry: Arc<Registry>,
    state: RwLock<AggregatorState>,
}

impl WhitelistControllerAggregator {
    /// Create an uninitialized aggregator at `address`, resolving controller
    /// references through `registry`.
    pub fn new(address: Address, registry: Arc<Registry>) -> Self {
        Self {
            address,
            registry,
            state: RwLock::new(AggregatorState {
                owner: None,
                controllers: Vec::new(),
                caller_admins: IndexSet::new(),
                authorized_callers: IndexSet::new(),
                events: Vec::new(),
            }),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// One-time setup: the caller becomes the owner and the default static
    /// controller is created at `default_controller`, owned by the same
    /// caller, registered and placed at index 0.
    pub fn initialize(
        &self,
        caller: &Address,
        default_controller: Address,
    ) -> Result<Arc<StaticWhitelistController>, WhitelistError> {
        let mut state = self.state.write();
        if state.owner.is_some() {
            return Err(WhitelistError::AlreadyInitialized);
        }

        let controller = Arc::new(StaticWhitelistController::new(default_controller.clone()));
        controller.initialize(caller)?;
        self.registry.register_controller(controller.clone());

        state.owner = Some(caller.clone());
        state.controllers.push(default_controller.clone());
        state.events.push(AggregatorEvent::ControllerAdded {
            controller: default_controller,
            index: 0,
        });
        log::info!(
            "whitelist aggregator {} initialized, owner {}, default controller {}",
            self.address,
            caller,
            controller.address()
        );
        Ok(controller)
    }

    pub fn owner(&self) -> Option<Address> {
        self.state.read().owner.clone()
    }

    pub fn transfer_ownership(
        &self,
        caller: &Address,
        new_owner: &Address,
    ) -> Result<(), WhitelistError> {
        if new_owner.is_zero() {
            return Err(WhitelistError::InvalidAddress);
        }
        let mut state = self.state.write();
        ensure_owner(&state.owner, caller)?;
        state.owner = Some(new_owner.clone());
        Ok(())
    }

    /// Append a controller reference, returning its index.
    ///
    /// The target is not validated against the controller contract;
    /// misconfiguration is a caller responsibility and shows up as a query
    /// failure.
    pub fn add(&self, caller: &Address, controller: Address) -> Result<usize, WhitelistError> {
        let mut state = self.state.write();
        ensure_owner(&state.owner, caller)?;
        let index = state.controllers.len();
        state.controllers.push(controller.clone());
        state
            .events
            .push(AggregatorEvent::ControllerAdded { controller: controller.clone(), index });
        log::info!(
            "whitelist aggregator {}: controller {} added at index {}",
            self.address,
            controller,
            index
        );
        Ok(index)
    }

    /// Remove the controller at `index` using swap-and-pop: the last element
    /// moves into the vacated slot, so the removed index is re-occupied and
    /// stale indices held by callers are not stable.
    pub fn remove(&self, caller: &Address, index: usize) -> Result<(), WhitelistError> {
        let mut state = self.state.write();
        ensure_owner(&state.owner, caller)?;
        let len = state.controllers.len();
        if index >= len {
            return Err(WhitelistError::IndexOutOfBounds { index, len });
        }
        let controller = state.controllers.swap_remove(index);
        state
            .events
            .push(AggregatorEvent::ControllerRemoved { controller: controller.clone(), index });
        log::info!(
            "whitelist aggregator {}: controller {} removed from index {}",
            self.address,
            controller,
            index
        );
        Ok(())
    }

    /// Owner-only mutation of the caller-admin set
    pub fn set_caller_admin(
        &self,
        caller: &Address,
        address: &Address,
        enabled: bool,
    ) -> Result<(), WhitelistError> {
        let mut state = self.state.write();
        ensure_owner(&state.owner, caller)?;
        if enabled {
            state.caller_admins.insert(address.clone());
        } else {
            state.caller_admins.swap_remove(address);
        }
        state.events.push(AggregatorEvent::CallerAdminSet {
            address: address.clone(),
            enabled,
        });
        Ok(())
    }

    /// Caller-admin-only mutation of the authorized-caller set
    pub fn set_caller(
        &self,
        caller: &Address,
        address: &Address,
        enabled: bool,
    ) -> Result<(), WhitelistError> {
        let mut state = self.state.write();
        if !state.caller_admins.contains(caller) {
            return Err(WhitelistError::Unauthorized);
        }
        if enabled {
            state.authorized_callers.insert(address.clone());
        } else {
            state.authorized_callers.swap_remove(address);
        }
        state.events.push(AggregatorEvent::CallerSet {
            address: address.clone(),
            enabled,
        });
        Ok(())
    }

    pub fn is_caller_admin(&self, address: &Address) -> bool {
        self.state.read().caller_admins.contains(address)
    }

    pub fn is_authorized_caller(&self, address: &Address) -> bool {
        self.state.read().authorized_callers.contains(address)
    }

    pub fn len(&self) -> usize {
        self.state.read().controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().controllers.is_empty()
    }

    pub fn controllers(&self) -> Vec<Address> {
        self.state.read().controllers.clone()
    }

    pub fn controller_at(&self, index: usize) -> Result<Address, WhitelistError> {
        let state = self.state.read();
        let len = state.controllers.len();
        state
            .controllers
            .get(index)
            .cloned()
            .ok_or(WhitelistError::IndexOutOfBounds { index, len })
    }

    /// Run the whitelist query for `subject`.
    ///
    /// Restricted to authorized callers. Controllers are consulted in index
    /// order; the first one answering true decides the result and its
    /// address is reported. `Ok(None)` means no controller recognized the
    /// subject. Controller failures are not swallowed.
    pub fn is_whitelisted(
        &self,
        caller: &Address,
        subject: &Address,
        now: TimestampSeconds,
    ) -> Result<Option<Address>, WhitelistError> {
        let controllers = {
            let state = self.state.read();
            if !state.authorized_callers.contains(caller) {
                return Err(WhitelistError::Unauthorized);
            }
            state.controllers.clone()
        };

        // Fan-out runs with the aggregator's own identity: the aggregator is
        // the registered caller for gated adapter controllers.
        let query = WhitelistQuery::new(self.address.clone(), now);
        for address in controllers {
            let controller = self
                .registry
                .controller(&address)
                .ok_or_else(|| WhitelistError::ControllerUnavailable(address.clone()))?;
            if controller.is_whitelisted(&query, subject)? {
                log::debug!(
                    "whitelist aggregator {}: {} whitelisted by controller {}",
                    self.address,
                    subject,
                    address
                );
                return Ok(Some(address));
            }
        }
        Ok(None)
    }

    /// Hand out accumulated events, clearing the log
    pub fn drain_events(&self) -> Vec<AggregatorEvent> {
        std::mem::take(&mut self.state.write().events)
    }
}

fn ensure_owner(owner: &Option<Address>, caller: &Address) -> Result<(), WhitelistError> {
    match owner {
        Some(owner) if owner == caller => Ok(()),
        _ => Err(WhitelistError::Unauthorized),
    }
}
