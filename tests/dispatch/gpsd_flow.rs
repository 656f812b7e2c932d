use std::sync::Arc;
use std::time::Duration;

use sms_locator::dispatch::{CapabilitySet, DispatchSettings, Phase, Position};
use sms_locator::platform::{GpsdPositioning, RecordingTransport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::harness;

/// Accept one client, wait for its WATCH, then stream `reports`.
async fn serve_reports(reports: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 128];
        let _ = socket.read(&mut buf).await.unwrap();
        socket
            .write_all(b"{\"class\":\"VERSION\",\"release\":\"3.25\"}\n")
            .await
            .unwrap();
        for report in reports {
            socket.write_all(report.as_bytes()).await.unwrap();
            socket.write_all(b"\n").await.unwrap();
        }
        // Hold the connection open so the client decides when to stop.
        tokio::time::sleep(Duration::from_secs(30)).await;
    });
    addr
}

#[tokio::test]
async fn locate_reads_3d_fix_from_gpsd() {
    let addr = serve_reports(vec![
        r#"{"class":"TPV","mode":2,"lat":1.0,"lon":1.0}"#.to_string(),
        r#"{"class":"TPV","mode":3,"lat":-33.868820,"lon":151.209296}"#.to_string(),
    ])
    .await;

    let rig = harness::spawn(
        DispatchSettings::default(),
        CapabilitySet {
            positioning: true,
            messaging: false,
        },
        Arc::new(GpsdPositioning::new(addr)),
        Arc::new(RecordingTransport::new()),
    );
    rig.handle.locate().await.unwrap();

    let done = rig.handle.settled().await.unwrap();
    assert_eq!(done.phase, Phase::Succeeded);
    assert_eq!(done.position, Some(Position::new(-33.868_82, 151.209_296).unwrap()));
    assert_eq!(
        done.success_message.as_deref(),
        Some("Location acquired: -33.868820, 151.209296")
    );

    rig.handle.shutdown().await;
}

#[tokio::test]
async fn gpsd_without_fix_fails_the_attempt() {
    let reports = vec![r#"{"class":"TPV","mode":1}"#.to_string(); 12];
    let addr = serve_reports(reports).await;

    let transport = Arc::new(RecordingTransport::new());
    let rig = harness::spawn(
        DispatchSettings::default(),
        CapabilitySet::all(),
        Arc::new(GpsdPositioning::new(addr)),
        transport.clone(),
    );
    rig.handle.update_destination("3012345678").await.unwrap();
    rig.handle.submit().await.unwrap();

    let done = rig.handle.settled().await.unwrap();
    assert_eq!(done.phase, Phase::Failed);
    assert_eq!(
        done.error_message.as_deref(),
        Some("Could not get GPS location. Check that GPS is enabled.")
    );
    assert!(transport.sent().is_empty());

    rig.handle.shutdown().await;
}

#[tokio::test]
async fn unreachable_gpsd_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let rig = harness::spawn(
        DispatchSettings::default(),
        CapabilitySet::all(),
        Arc::new(GpsdPositioning::new(addr)),
        Arc::new(RecordingTransport::new()),
    );
    rig.handle.locate().await.unwrap();

    let done = rig.handle.settled().await.unwrap();
    assert_eq!(done.phase, Phase::Failed);
    let message = done.error_message.unwrap_or_default();
    assert!(message.starts_with("Error getting location:"), "{message}");
    assert!(message.contains("Failed to connect to gpsd"), "{message}");

    rig.handle.shutdown().await;
}
