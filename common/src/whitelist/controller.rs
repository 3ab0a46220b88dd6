//! Static whitelist controller
//!
//! The simplest backend: an owner-managed membership set. The query surface
//! is unauthenticated (anyone may ask); caller gating happens at the
//! aggregator layer, not here.

use indexmap::IndexSet;
use parking_lot::RwLock;

use crate::crypto::Address;
use crate::whitelist::{WhitelistController, WhitelistError, WhitelistQuery};

struct ControllerState {
    owner: Option<Address>,
    members: IndexSet<Address>,
}

pub struct StaticWhitelistController {
    address: Address,
    state: RwLock<ControllerState>,
}

impl StaticWhitelistController {
    /// Create an uninitialized controller at `address`.
    ///
    /// The instance has no owner until `initialize` runs; every owner-gated
    /// operation fails `Unauthorized` until then.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            state: RwLock::new(ControllerState {
                owner: None,
                members: IndexSet::new(),
            }),
        }
    }

    /// One-time setup: the caller becomes the owner.
    pub fn initialize(&self, caller: &Address) -> Result<(), WhitelistError> {
        let mut state = self.state.write();
        if state.owner.is_some() {
            return Err(WhitelistError::AlreadyInitialized);
        }
        state.owner = Some(caller.clone());
        log::debug!("whitelist controller {} initialized, owner {}", self.address, caller);
        Ok(())
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

    /// Insert each address into the membership set. Idempotent: addresses
    /// already present are left untouched.
    pub fn add(&self, caller: &Address, addresses: &[Address]) -> Result<(), WhitelistError> {
        let mut state = self.state.write();
        ensure_owner(&state.owner, caller)?;
        for address in addresses {
            state.members.insert(address.clone());
        }
        log::debug!(
            "whitelist controller {}: added {} address(es), {} member(s) total",
            self.address,
            addresses.len(),
            state.members.len()
        );
        Ok(())
    }

    /// Delete each address from the membership set. Removing a non-member is
    /// a no-op.
    pub fn remove(&self, caller: &Address, addresses: &[Address]) -> Result<(), WhitelistError> {
        let mut state = self.state.write();
        ensure_owner(&state.owner, caller)?;
        for address in addresses {
            state.members.swap_remove(address);
        }
        log::debug!(
            "whitelist controller {}: removed {} address(es), {} member(s) left",
            self.address,
            addresses.len(),
            state.members.len()
        );
        Ok(())
    }

    /// Unauthenticated membership read
    pub fn contains(&self, subject: &Address) -> bool {
        self.state.read().members.contains(subject)
    }

    pub fn member_count(&self) -> usize {
        self.state.read().members.len()
    }
}

impl WhitelistController for StaticWhitelistController {
    fn address(&self) -> &Address {
        &self.address
    }

    fn is_whitelisted(
        &self,
        _query: &WhitelistQuery,
        subject: &Address,
    ) -> Result<bool, WhitelistError> {
        Ok(self.contains(subject))
    }
}

fn ensure_owner(owner: &Option<Address>, caller: &Address) -> Result<(), WhitelistError> {
    match owner {
        Some(owner) if owner == caller => Ok(()),
        _ => Err(WhitelistError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized(owner: &Address) -> StaticWhitelistController {
        let controller = StaticWhitelistController::new(Address::random());
        controller.initialize(owner).unwrap();
        controller
    }

    #[test]
    fn initialize_twice_fails() {
        let owner = Address::random();
        let controller = initialized(&owner);
        assert_eq!(
            controller.initialize(&owner),
            Err(WhitelistError::AlreadyInitialized)
        );
    }

    #[test]
    fn add_marks_each_address_whitelisted() {
        let owner = Address::random();
        let other = Address::random();
        let controller = initialized(&owner);

        controller.add(&owner, &[owner.clone(), other.clone()]).unwrap();
        assert!(controller.contains(&owner));
        assert!(controller.contains(&other));
    }

    #[test]
    fn add_requires_owner() {
        let owner = Address::random();
        let actor = Address::random();
        let controller = initialized(&owner);

        assert_eq!(
            controller.add(&actor, &[actor.clone()]),
            Err(WhitelistError::Unauthorized)
        );
    }

    #[test]
    fn add_is_idempotent() {
        let owner = Address::random();
        let controller = initialized(&owner);

        controller.add(&owner, &[owner.clone()]).unwrap();
        controller.add(&owner, &[owner.clone()]).unwrap();
        assert_eq!(controller.member_count(), 1);
    }

    #[test]
    fn remove_unmarks_each_address() {
        let owner = Address::random();
        let other = Address::random();
        let controller = initialized(&owner);

        controller.add(&owner, &[owner.clone(), other.clone()]).unwrap();
        controller.remove(&owner, &[owner.clone(), other.clone()]).unwrap();
        assert!(!controller.contains(&owner));
        assert!(!controller.contains(&other));
    }

    #[test]
    fn remove_of_non_member_is_noop() {
        let owner = Address::random();
        let controller = initialized(&owner);

        controller.add(&owner, &[owner.clone()]).unwrap();
        controller.remove(&owner, &[Address::random()]).unwrap();
        assert_eq!(controller.member_count(), 1);
    }

    #[test]
    fn remove_requires_owner() {
        let owner = Address::random();
        let actor = Address::random();
        let controller = initialized(&owner);

        assert_eq!(
            controller.remove(&actor, &[owner.clone()]),
            Err(WhitelistError::Unauthorized)
        );
    }

    #[test]
    fn ownership_transfer_gates_mutations() {
        let owner = Address::random();
        let next = Address::random();
        let controller = initialized(&owner);

        assert_eq!(
            controller.transfer_ownership(&owner, &Address::zero()),
            Err(WhitelistError::InvalidAddress)
        );
        controller.transfer_ownership(&owner, &next).unwrap();
        assert_eq!(
            controller.add(&owner, &[owner.clone()]),
            Err(WhitelistError::Unauthorized)
        );
        controller.add(&next, &[owner.clone()]).unwrap();
    }

    #[test]
    fn uninitialized_controller_rejects_mutations() {
        let controller = StaticWhitelistController::new(Address::random());
        let caller = Address::random();
        assert_eq!(
            controller.add(&caller, &[caller.clone()]),
            Err(WhitelistError::Unauthorized)
        );
    }
}
