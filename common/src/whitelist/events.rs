use serde::{Deserialize, Serialize};

use crate::crypto::Address;

/// Notifications emitted by the aggregator for off-chain observers.
///
/// Events are accumulated per instance and handed out through
/// `drain_events`; no in-system component consumes them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum AggregatorEvent {
    /// Controller reference appended at `index`
    ControllerAdded { controller: Address, index: usize },
    /// Controller reference removed from `index` (swap-and-pop)
    ControllerRemoved { controller: Address, index: usize },
    /// Caller-admin set membership changed
    CallerAdminSet { address: Address, enabled: bool },
    /// Authorized-caller set membership changed
    CallerSet { address: Address, enabled: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let event = AggregatorEvent::ControllerAdded {
            controller: Address::new([5u8; 32]),
            index: 2,
        };
        let data = serde_json::to_vec(&event)?;
        let decoded: AggregatorEvent = serde_json::from_slice(&data)?;
        assert_eq!(event, decoded);
        Ok(())
    }

    #[test]
    fn event_is_tagged_for_observers() -> Result<(), Box<dyn std::error::Error>> {
        let event = AggregatorEvent::CallerSet {
            address: Address::new([1u8; 32]),
            enabled: true,
        };
        let json = serde_json::to_value(&event)?;
        assert_eq!(json["event"], "callerSet");
        assert_eq!(json["enabled"], true);
        Ok(())
    }
}
