#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use sms_locator::dispatch::{
    CapabilitySet, Collaborators, DispatchController, DispatchHandle, DispatchSettings, Position,
};
use sms_locator::platform::{
    FixScript, MessagingTransport, PositioningProvider, RecordingTransport, ScriptedPositioning,
    SimulatedCapabilities,
};

pub const BOGOTA: (f64, f64) = (4.71, -74.0721);

pub fn bogota() -> Position {
    Position::new(BOGOTA.0, BOGOTA.1).unwrap()
}

pub struct Harness {
    pub handle: DispatchHandle,
    pub capabilities: Arc<SimulatedCapabilities>,
}

pub fn spawn(
    settings: DispatchSettings,
    grants: CapabilitySet,
    positioning: Arc<dyn PositioningProvider>,
    transport: Arc<dyn MessagingTransport>,
) -> Harness {
    let capabilities = Arc::new(SimulatedCapabilities::new(grants));
    let handle = DispatchController::spawn(
        settings,
        Collaborators {
            capabilities: capabilities.clone(),
            positioning,
            transport,
        },
    );
    Harness {
        handle,
        capabilities,
    }
}

pub fn recording(delay: Duration) -> (Arc<ScriptedPositioning>, Arc<RecordingTransport>) {
    (
        Arc::new(ScriptedPositioning::new(FixScript::Fix(bogota())).with_delay(delay)),
        Arc::new(RecordingTransport::new()),
    )
}
