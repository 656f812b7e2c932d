use super::capability::CapabilitySet;
use super::location::Position;
use serde::{Deserialize, Serialize};

/// Where the workflow currently is.
///
/// Validation happens synchronously on submit and is never observed as a
/// phase of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    AcquiringLocation,
    Transmitting,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::AcquiringLocation | Self::Transmitting)
    }
}

/// Read-only snapshot published to observers after every transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub phase: Phase,
    /// Raw destination text as typed.
    pub destination: String,
    pub destination_valid: bool,
    /// Field-level validation message for a non-empty invalid destination.
    pub destination_error: Option<String>,
    pub acquiring_location: bool,
    pub transmitting: bool,
    pub position: Option<Position>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub positioning_granted: bool,
    pub messaging_granted: bool,
    /// Ask the user to grant the missing capabilities.
    pub permission_prompt: bool,
}

impl WorkflowState {
    pub fn capabilities(&self) -> CapabilitySet {
        CapabilitySet {
            positioning: self.positioning_granted,
            messaging: self.messaging_granted,
        }
    }

    pub(crate) fn set_capabilities(&mut self, set: CapabilitySet) {
        self.positioning_granted = set.positioning;
        self.messaging_granted = set.messaging;
    }

    /// Drop the displayed result and position; destination and grants stay.
    pub(crate) fn clear_result(&mut self) {
        self.success_message = None;
        self.error_message = None;
        self.position = None;
    }

    /// True when the documented state invariants hold.
    pub fn is_consistent(&self) -> bool {
        let single_activity = !(self.acquiring_location && self.transmitting);
        let single_message = !(self.success_message.is_some() && self.error_message.is_some());
        let position_shown = self.position.is_none()
            || self.transmitting
            || (self.phase == Phase::Succeeded && self.success_message.is_some());
        let flags_match_phase = self.acquiring_location
            == (self.phase == Phase::AcquiringLocation)
            && self.transmitting == (self.phase == Phase::Transmitting);
        single_activity && single_message && position_shown && flags_match_phase
    }
}
