use crate::error::CapabilityMissing;
use crate::platform::traits::CapabilityProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The two system capabilities a dispatch depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    Positioning,
    Messaging,
}

/// Snapshot of which capabilities the platform currently grants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub positioning: bool,
    pub messaging: bool,
}

impl CapabilitySet {
    pub fn all() -> Self {
        Self {
            positioning: true,
            messaging: true,
        }
    }

    pub fn has(self, capability: Capability) -> bool {
        match capability {
            Capability::Positioning => self.positioning,
            Capability::Messaging => self.messaging,
        }
    }

    /// Ok when every capability in `required` is granted.
    pub fn require(self, required: &[Capability]) -> Result<(), CapabilityMissing> {
        let missing: Vec<Capability> = required
            .iter()
            .copied()
            .filter(|capability| !self.has(*capability))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CapabilityMissing { missing })
        }
    }
}

/// Reads platform grants and decides whether a dispatch may proceed.
///
/// The gate never asks the platform for a capability; it only reports what
/// is missing so the presentation layer can prompt for it.
#[derive(Clone)]
pub struct CapabilityGate {
    provider: Arc<dyn CapabilityProvider>,
}

impl CapabilityGate {
    pub const SEND: &'static [Capability] = &[Capability::Positioning, Capability::Messaging];
    pub const LOCATE: &'static [Capability] = &[Capability::Positioning];

    pub fn new(provider: Arc<dyn CapabilityProvider>) -> Self {
        Self { provider }
    }

    pub fn query(&self) -> CapabilitySet {
        CapabilitySet {
            positioning: self.provider.is_granted(Capability::Positioning),
            messaging: self.provider.is_granted(Capability::Messaging),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::simulated::SimulatedCapabilities;

    #[test]
    fn query_mirrors_provider() {
        let provider = Arc::new(SimulatedCapabilities::new(CapabilitySet {
            positioning: true,
            messaging: false,
        }));
        let gate = CapabilityGate::new(provider.clone());
        assert_eq!(
            gate.query(),
            CapabilitySet {
                positioning: true,
                messaging: false
            }
        );

        provider.grant(Capability::Messaging);
        assert_eq!(gate.query(), CapabilitySet::all());
    }

    #[test]
    fn send_requires_both_capabilities() {
        let provider = Arc::new(SimulatedCapabilities::new(CapabilitySet::default()));
        let gate = CapabilityGate::new(provider.clone());

        let err = gate.query().require(CapabilityGate::SEND).unwrap_err();
        assert_eq!(
            err.missing,
            vec![Capability::Positioning, Capability::Messaging]
        );

        provider.grant(Capability::Positioning);
        let err = gate.query().require(CapabilityGate::SEND).unwrap_err();
        assert_eq!(err.missing, vec![Capability::Messaging]);

        provider.grant(Capability::Messaging);
        assert!(gate.query().require(CapabilityGate::SEND).is_ok());
    }

    #[test]
    fn locate_only_needs_positioning() {
        let set = CapabilitySet {
            positioning: true,
            messaging: false,
        };
        assert!(set.require(CapabilityGate::LOCATE).is_ok());
        assert!(set.require(CapabilityGate::SEND).is_err());
    }

    #[test]
    fn capability_names_are_snake_case() {
        assert_eq!(Capability::Positioning.to_string(), "positioning");
        assert_eq!(Capability::Messaging.to_string(), "messaging");
    }
}
