use serde::{Deserialize, Serialize};

use crate::crypto::Address;

/// Notifications emitted by the factory for off-chain observers
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum FactoryEvent {
    /// A wrapped-token instance was deployed
    TokenDeployed { token: Address, symbol: String },
    /// The token implementation reference changed
    NewImplementation { implementation: Address },
    /// The controller-aggregator reference changed
    NewController { controller: Address },
}
