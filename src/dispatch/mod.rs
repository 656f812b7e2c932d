//! Location acquisition and dispatch workflow.

pub mod capability;
pub mod chunker;
pub mod controller;
pub mod encoder;
pub mod events;
pub mod location;
pub mod reset;
pub mod state;
pub mod validator;

pub use capability::{Capability, CapabilityGate, CapabilitySet};
pub use controller::{
    Ack, Collaborators, DispatchController, DispatchHandle, DispatchSettings, Intent,
};
pub use encoder::{EncodedMessage, encode};
pub use events::{AttemptKind, DispatchEvent};
pub use location::{Cancellable, LocationService, Position};
pub use state::{Phase, WorkflowState};
pub use validator::{Destination, Validation, validate};
