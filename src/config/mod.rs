pub mod schema;

pub use schema::{
    CapabilitiesConfig, Config, DestinationConfig, DispatchConfig, ObservabilityConfig,
    PositioningBackend, PositioningConfig, TransportBackend, TransportConfig,
};
