mod env_overrides;
mod loader;
mod locale;
#[cfg(test)]
mod test_env;
mod types;
mod validation;

pub use types::{
    CapabilitiesConfig, Config, DestinationConfig, DispatchConfig, ObservabilityConfig,
    PositioningBackend, PositioningConfig, TransportBackend, TransportConfig,
};
