use crate::cli::commands::{Cli, Commands};
use crate::config::Config;
use crate::dispatch::controller::{
    Ack, Collaborators, DispatchController, DispatchHandle, DispatchSettings,
};
use crate::dispatch::encoder::{self, format_coordinate};
use crate::dispatch::events::{AttemptKind, DispatchEvent};
use crate::dispatch::location::Position;
use crate::dispatch::validator;
use crate::error::HandleError;
use crate::platform::{self, SimulatedCapabilities};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use super::interactive;
use super::render::{render_config, render_encoded, render_validation};

/// A running controller wired to the configured adapters.
pub struct Session {
    pub handle: DispatchHandle,
    pub capabilities: Arc<SimulatedCapabilities>,
}

impl Session {
    pub fn start(config: &Config) -> Result<Self> {
        let capabilities = platform::create_capabilities(&config.capabilities);
        let positioning = platform::create_positioning(&config.positioning)?;
        let transport = platform::create_transport(&config.transport)?;
        info!(
            positioning = positioning.name(),
            transport = transport.name(),
            "collaborators ready"
        );
        let handle = DispatchController::spawn(
            DispatchSettings::from_config(config),
            Collaborators {
                capabilities: capabilities.clone(),
                positioning,
                transport,
            },
        );
        Ok(Self {
            handle,
            capabilities,
        })
    }
}

/// How a one-shot attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Sent {
        destination: String,
        segments: usize,
        latitude: f64,
        longitude: f64,
    },
    Located {
        latitude: f64,
        longitude: f64,
    },
}

/// Start one attempt and follow its events to the end.
///
/// Events rather than the state snapshot are followed so an auto-reset
/// racing the caller cannot hide the outcome.
pub async fn run_attempt(handle: &DispatchHandle, kind: AttemptKind) -> Result<Outcome> {
    let mut events = handle.events();
    let ack = match kind {
        AttemptKind::Send => handle.submit().await?,
        AttemptKind::Locate => handle.locate().await?,
    };
    let attempt = match ack {
        Ack::Started { attempt } => attempt,
        Ack::Rejected { message } => bail!(message),
        Ack::Ignored => bail!(t!("attempt.busy").to_string()),
        Ack::Applied => bail!("unexpected acknowledgement for {kind}"),
    };
    debug!(attempt = %attempt, mode = %kind, "following attempt");

    let mut acquired = None;
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "event stream lagged");
                continue;
            }
            Err(RecvError::Closed) => return Err(HandleError::Closed.into()),
        };
        match event {
            DispatchEvent::LocationAcquired {
                attempt: id,
                latitude,
                longitude,
            } if id == attempt => {
                if kind == AttemptKind::Locate {
                    return Ok(Outcome::Located {
                        latitude,
                        longitude,
                    });
                }
                acquired = Some((latitude, longitude));
            }
            DispatchEvent::MessageSent {
                attempt: id,
                destination,
                segments,
            } if id == attempt => {
                let (latitude, longitude) = acquired.unwrap_or_default();
                return Ok(Outcome::Sent {
                    destination,
                    segments,
                    latitude,
                    longitude,
                });
            }
            DispatchEvent::AttemptFailed { attempt: id, message } if id == attempt => {
                bail!(message)
            }
            _ => {}
        }
    }
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Sent {
            destination,
            segments,
            latitude,
            longitude,
        } => t!(
            "attempt.sent",
            destination = destination,
            segments = segments,
            lat = format_coordinate(*latitude),
            lon = format_coordinate(*longitude)
        )
        .to_string(),
        Outcome::Located {
            latitude,
            longitude,
        } => t!(
            "attempt.located",
            lat = format_coordinate(*latitude),
            lon = format_coordinate(*longitude)
        )
        .to_string(),
    }
}

async fn one_shot(config: &Config, kind: AttemptKind, number: Option<String>) -> Result<()> {
    let session = Session::start(config)?;
    let handle = session.handle;
    if let Some(number) = number {
        handle.update_destination(number).await?;
    }

    let result = tokio::select! {
        result = run_attempt(&handle, kind) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for ctrl-c")?;
            Err(anyhow::anyhow!(t!("attempt.interrupted").to_string()))
        }
    };
    handle.shutdown().await;

    let outcome = result?;
    println!("{}", render_outcome(&outcome));
    Ok(())
}

fn parse_timestamp(millis: Option<i64>) -> Result<DateTime<Utc>> {
    match millis {
        None => Ok(Utc::now()),
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .with_context(|| format!("timestamp {ms} is out of range")),
    }
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Validate { number } => {
            let validation = validator::validate(&number, &config.destination);
            if !validation.is_valid() {
                bail!(render_validation(&validation));
            }
            println!("{}", render_validation(&validation));
            Ok(())
        }
        Commands::Encode {
            lat,
            lon,
            timestamp,
            segment_limit,
        } => {
            let position = Position::new(lat, lon)?;
            let message = encoder::encode(
                &position,
                parse_timestamp(timestamp)?,
                segment_limit.unwrap_or(config.dispatch.segment_limit),
            );
            println!("{}", render_encoded(&message));
            Ok(())
        }
        Commands::Send { number } => one_shot(&config, AttemptKind::Send, Some(number)).await,
        Commands::Locate => one_shot(&config, AttemptKind::Locate, None).await,
        Commands::Interactive => {
            let session = Session::start(&config)?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let result = interactive::run_session(&session, stdin, tokio::io::stdout()).await;
            session.handle.shutdown().await;
            result
        }
        Commands::Config => {
            println!("{}", render_config(&config));
            Ok(())
        }
    }
}
