//! Collaborator contracts and the adapters that fulfil them.

pub mod console;
pub mod factory;
pub mod gateway;
pub mod gpsd;
pub mod simulated;
pub mod traits;

pub use console::ConsoleTransport;
pub use factory::{create_capabilities, create_positioning, create_transport};
pub use gateway::HttpSmsGateway;
pub use gpsd::GpsdPositioning;
pub use simulated::{FixScript, RecordingTransport, ScriptedPositioning, SimulatedCapabilities};
pub use traits::{Accuracy, CapabilityProvider, MessagingTransport, PositioningProvider};
