use std::time::Duration;

use sms_locator::dispatch::encoder::parse;
use sms_locator::dispatch::{
    Ack, Capability, CapabilitySet, DispatchEvent, DispatchSettings, Phase,
};

use super::harness::{self, BOGOTA};

#[tokio::test(start_paused = true)]
async fn full_send_cycle_returns_to_idle() {
    let (positioning, transport) = harness::recording(Duration::from_millis(300));
    let rig = harness::spawn(
        DispatchSettings::default(),
        CapabilitySet::all(),
        positioning,
        transport.clone(),
    );
    let handle = &rig.handle;
    let mut events = handle.events();

    handle.update_destination("(301) 234-5678").await.unwrap();
    assert!(handle.snapshot().destination_valid);

    let Ack::Started { attempt } = handle.submit().await.unwrap() else {
        panic!("expected the attempt to start");
    };
    assert!(handle.snapshot().acquiring_location);

    let done = handle.settled().await.unwrap();
    assert_eq!(done.phase, Phase::Succeeded);
    assert!(done.is_consistent());
    assert_eq!(done.destination, "");
    assert_eq!(
        done.success_message.as_deref(),
        Some("SMS sent to +573012345678\nLAT: 4.710000, LON: -74.072100")
    );

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination, "+573012345678");
    let (lat, lon, _) = parse(&sent[0].segments.concat()).unwrap();
    assert!((lat - BOGOTA.0).abs() < 1e-6);
    assert!((lon - BOGOTA.1).abs() < 1e-6);

    let idle = handle
        .wait_for(|state| state.phase == Phase::Idle)
        .await
        .unwrap();
    assert!(idle.success_message.is_none());
    assert!(idle.position.is_none());

    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(event);
    }
    assert!(matches!(
        kinds.first(),
        Some(DispatchEvent::AttemptStarted { attempt: id, .. }) if *id == attempt
    ));
    assert!(matches!(
        kinds.last(),
        Some(DispatchEvent::ResultCleared { automatic: true })
    ));

    handle.shutdown().await;
}

#[tokio::test]
async fn rejected_submit_does_not_touch_transport() {
    let (positioning, transport) = harness::recording(Duration::ZERO);
    let rig = harness::spawn(
        DispatchSettings::default(),
        CapabilitySet {
            positioning: true,
            messaging: false,
        },
        positioning.clone(),
        transport.clone(),
    );

    rig.handle.update_destination("3012345678").await.unwrap();
    let ack = rig.handle.submit().await.unwrap();
    assert_eq!(
        ack,
        Ack::Rejected {
            message: "SMS permission is required".into()
        }
    );
    let state = rig.handle.snapshot();
    assert_eq!(state.phase, Phase::Idle);
    assert!(state.permission_prompt);
    assert_eq!(positioning.requests(), 0);
    assert!(transport.sent().is_empty());

    rig.capabilities.grant(Capability::Messaging);
    rig.handle.on_capability_grant_event().await.unwrap();
    assert!(matches!(rig.handle.submit().await.unwrap(), Ack::Started { .. }));
    assert_eq!(rig.handle.settled().await.unwrap().phase, Phase::Succeeded);

    rig.handle.shutdown().await;
}
