//! Positioning from a local `gpsd` daemon over its JSON socket protocol.
//!
//! The client issues `?WATCH` and reads report lines until a `TPV` report
//! carries a fix good enough for the requested accuracy.

use super::traits::{Accuracy, PositioningProvider, ProviderFault};
use crate::dispatch::location::Position;
use anyhow::Context;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true};\n";

/// TPV reports read before concluding the receiver has no fix.
const DEFAULT_MAX_REPORTS: usize = 10;

/// `mode` values from the TPV report.
const MODE_2D: u8 = 2;
const MODE_3D: u8 = 3;

#[derive(Debug, Deserialize)]
struct Report {
    class: String,
    #[serde(default)]
    mode: u8,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl Report {
    /// A position when this is a TPV report meeting `accuracy`.
    fn fix(&self, accuracy: Accuracy) -> Option<Position> {
        if self.class != "TPV" {
            return None;
        }
        let required = match accuracy {
            Accuracy::High => MODE_3D,
            Accuracy::Balanced => MODE_2D,
        };
        if self.mode < required {
            return None;
        }
        Position::new(self.lat?, self.lon?).ok()
    }
}

pub struct GpsdPositioning {
    addr: String,
    max_reports: usize,
}

impl GpsdPositioning {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            max_reports: DEFAULT_MAX_REPORTS,
        }
    }

    pub fn with_max_reports(mut self, max_reports: usize) -> Self {
        self.max_reports = max_reports.max(1);
        self
    }

    async fn read_fix(&self, accuracy: Accuracy) -> anyhow::Result<Option<Position>> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .with_context(|| format!("Failed to connect to gpsd at {}", self.addr))?;
        let (reader, mut writer) = stream.into_split();
        writer
            .write_all(WATCH_COMMAND)
            .await
            .context("Failed to send WATCH to gpsd")?;

        let mut lines = BufReader::new(reader).lines();
        let mut tpv_seen = 0;
        while let Some(line) = lines.next_line().await? {
            let Ok(report) = serde_json::from_str::<Report>(&line) else {
                tracing::debug!(line = %line, "Skipping unparseable gpsd line");
                continue;
            };
            if report.class != "TPV" {
                continue;
            }
            if let Some(position) = report.fix(accuracy) {
                return Ok(Some(position));
            }
            tpv_seen += 1;
            tracing::debug!(mode = report.mode, tpv_seen, "gpsd report without usable fix");
            if tpv_seen >= self.max_reports {
                return Ok(None);
            }
        }
        anyhow::bail!("gpsd closed the connection before reporting a fix")
    }
}

impl PositioningProvider for GpsdPositioning {
    fn name(&self) -> &str {
        "gpsd"
    }

    fn request_current_fix<'a>(
        &'a self,
        accuracy: Accuracy,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Position>, ProviderFault>> + Send + 'a>> {
        Box::pin(async move { Ok(self.read_fix(accuracy).await?) })
    }
}
