use crate::config::{
    CapabilitiesConfig, PositioningBackend, PositioningConfig, TransportBackend, TransportConfig,
};
use crate::dispatch::capability::CapabilitySet;
use crate::dispatch::location::Position;
use std::sync::Arc;
use std::time::Duration;

use super::{
    ConsoleTransport, FixScript, GpsdPositioning, HttpSmsGateway, MessagingTransport,
    PositioningProvider, ScriptedPositioning, SimulatedCapabilities,
};

/// Factory: grant toggles seeded from config
pub fn create_capabilities(config: &CapabilitiesConfig) -> Arc<SimulatedCapabilities> {
    Arc::new(SimulatedCapabilities::new(CapabilitySet {
        positioning: config.positioning,
        messaging: config.messaging,
    }))
}

/// Factory: create the positioning source from config
pub fn create_positioning(
    config: &PositioningConfig,
) -> anyhow::Result<Arc<dyn PositioningProvider>> {
    match config.backend {
        PositioningBackend::Fixed => {
            let position = Position::new(config.latitude, config.longitude)?;
            Ok(Arc::new(ScriptedPositioning::new(FixScript::Fix(position))))
        }
        PositioningBackend::Gpsd => Ok(Arc::new(GpsdPositioning::new(config.gpsd_addr.clone()))),
    }
}

/// Factory: create the messaging transport from config
pub fn create_transport(config: &TransportConfig) -> anyhow::Result<Arc<dyn MessagingTransport>> {
    match config.backend {
        TransportBackend::Console => Ok(Arc::new(ConsoleTransport::new())),
        TransportBackend::Http => {
            let Some(endpoint) = config.endpoint.as_deref() else {
                anyhow::bail!("transport.backend='http' requires transport.endpoint");
            };
            Ok(Arc::new(HttpSmsGateway::new(
                endpoint,
                config.api_key.as_deref(),
                Duration::from_secs(config.timeout_secs.max(1)),
            )))
        }
    }
}
