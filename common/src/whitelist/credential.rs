//! Credential-window controller
//!
//! Derives whitelist status from the freshness of an external credential
//! instead of local membership: a subject is whitelisted while the elapsed
//! time since its last credential update stays strictly inside the policy
//! TTL. Compliance state lapses on its own once the credential goes stale,
//! without an explicit revocation call.

use std::sync::Arc;

use crate::crypto::Address;
use crate::time::TimestampSeconds;
use crate::whitelist::{WhitelistController, WhitelistError, WhitelistQuery};

/// External credential registry: last update time per subject (0 = never)
pub trait CredentialsSource: Send + Sync {
    fn last_update(&self, subject: &Address) -> TimestampSeconds;
}

/// External policy: maximum credential age, in seconds
pub trait PolicySource: Send + Sync {
    fn ttl(&self) -> u64;
}

/// Read-only projection of external credential state.
///
/// The query surface is gated to the single caller fixed at construction
/// (normally the aggregator), independently of the aggregator's own
/// two-tier caller model. There is no mutable state and therefore no
/// separate initialization step.
pub struct CredentialWindowController {
    address: Address,
    authorized_caller: Address,
    credentials: Arc<dyn CredentialsSource>,
    policy: Arc<dyn PolicySource>,
    caller_threshold: u32,
}

impl CredentialWindowController {
    pub fn new(
        address: Address,
        owner: Address,
        credentials: Arc<dyn CredentialsSource>,
        policy: Arc<dyn PolicySource>,
        caller_threshold: u32,
    ) -> Self {
        Self {
            address,
            authorized_caller: owner,
            credentials,
            policy,
            caller_threshold,
        }
    }

    pub fn authorized_caller(&self) -> &Address {
        &self.authorized_caller
    }

    /// Construction-time configuration value; never re-derived at query time
    pub fn caller_threshold(&self) -> u32 {
        self.caller_threshold
    }
}

impl WhitelistController for CredentialWindowController {
    fn address(&self) -> &Address {
        &self.address
    }

    fn is_whitelisted(
        &self,
        query: &WhitelistQuery,
        subject: &Address,
    ) -> Result<bool, WhitelistError> {
        if query.caller != self.authorized_caller {
            return Err(WhitelistError::Unauthorized);
        }

        let last_update = self.credentials.last_update(subject);
        if last_update == 0 {
            // Never updated means not whitelisted, irrespective of the TTL
            return Ok(false);
        }

        let elapsed = query.now.saturating_sub(last_update);
        Ok(elapsed < self.policy.ttl())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::RwLock;

    struct CredentialsStub {
        last_update: RwLock<TimestampSeconds>,
    }

    impl CredentialsStub {
        fn new(last_update: TimestampSeconds) -> Arc<Self> {
            Arc::new(Self {
                last_update: RwLock::new(last_update),
            })
        }

        fn set(&self, last_update: TimestampSeconds) {
            *self.last_update.write() = last_update;
        }
    }

    impl CredentialsSource for CredentialsStub {
        fn last_update(&self, _subject: &Address) -> TimestampSeconds {
            *self.last_update.read()
        }
    }

    struct PolicyStub(u64);

    impl PolicySource for PolicyStub {
        fn ttl(&self) -> u64 {
            self.0
        }
    }

    const NOW: TimestampSeconds = 1_700_000_000;

    fn controller(
        owner: &Address,
        credentials: Arc<CredentialsStub>,
    ) -> CredentialWindowController {
        CredentialWindowController::new(
            Address::random(),
            owner.clone(),
            credentials,
            Arc::new(PolicyStub(1000)),
            3,
        )
    }

    #[test]
    fn fresh_update_is_whitelisted() {
        let owner = Address::random();
        let controller = controller(&owner, CredentialsStub::new(NOW - 10));
        let query = WhitelistQuery::new(owner, NOW);
        assert_eq!(controller.is_whitelisted(&query, &Address::random()), Ok(true));
    }

    #[test]
    fn expired_update_is_not_whitelisted() {
        let owner = Address::random();
        let controller = controller(&owner, CredentialsStub::new(NOW - 1500));
        let query = WhitelistQuery::new(owner, NOW);
        assert_eq!(controller.is_whitelisted(&query, &Address::random()), Ok(false));
    }

    #[test]
    fn update_at_exact_ttl_boundary_is_not_whitelisted() {
        let owner = Address::random();
        let controller = controller(&owner, CredentialsStub::new(NOW - 1000));
        let query = WhitelistQuery::new(owner, NOW);
        assert_eq!(controller.is_whitelisted(&query, &Address::random()), Ok(false));
    }

    #[test]
    fn never_updated_is_not_whitelisted() {
        let owner = Address::random();
        let controller = controller(&owner, CredentialsStub::new(0));
        let query = WhitelistQuery::new(owner, NOW);
        assert_eq!(controller.is_whitelisted(&query, &Address::random()), Ok(false));
    }

    #[test]
    fn rejects_non_authorized_caller() {
        let owner = Address::random();
        let controller = controller(&owner, CredentialsStub::new(NOW - 10));
        let query = WhitelistQuery::new(Address::random(), NOW);
        assert_eq!(
            controller.is_whitelisted(&query, &Address::random()),
            Err(WhitelistError::Unauthorized)
        );
    }

    #[test]
    fn status_lapses_once_credential_goes_stale() {
        let owner = Address::random();
        let credentials = CredentialsStub::new(NOW - 10);
        let controller = controller(&owner, credentials.clone());

        let query = WhitelistQuery::new(owner.clone(), NOW);
        assert_eq!(controller.is_whitelisted(&query, &Address::random()), Ok(true));

        // Same credential, later clock: the window rolls shut on its own
        let later = WhitelistQuery::new(owner, NOW + 2000);
        assert_eq!(controller.is_whitelisted(&later, &Address::random()), Ok(false));

        // A refresh reopens it
        credentials.set(NOW + 1990);
        let refreshed = WhitelistQuery::new(controller.authorized_caller().clone(), NOW + 2000);
        assert_eq!(controller.is_whitelisted(&refreshed, &Address::random()), Ok(true));
    }
}
