//! The dispatch workflow state machine.
//!
//! A [`DispatchController`] runs as one tokio task and is the only writer of
//! [`WorkflowState`]. Intents arrive over a channel from any number of
//! [`DispatchHandle`]s; every transition is published through a `watch`
//! channel and mirrored on the event bus.
//!
//! Each attempt runs in its own task that reports progress back to the
//! controller. At most one attempt is in flight; a submit while one is
//! running is acknowledged as [`Ack::Ignored`].

use super::capability::{Capability, CapabilityGate};
use super::encoder;
use super::events::{AttemptKind, DispatchEvent, EventReceiver, EventSender, event_bus};
use super::location::{Cancellable, LocationService, Position};
use super::reset::ResetTimer;
use super::state::{Phase, WorkflowState};
use super::validator::{self, Destination};
use crate::config::{Config, DestinationConfig};
use crate::error::{AcquisitionError, CapabilityMissing, HandleError, TransmissionError};
use crate::platform::traits::{CapabilityProvider, MessagingTransport, PositioningProvider};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

const REQUEST_QUEUE: usize = 32;
const EVENT_CAPACITY: usize = 64;

/// Tunables for one controller instance.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub destination: DestinationConfig,
    pub segment_limit: usize,
    pub auto_reset: Duration,
    pub acquisition_timeout: Option<Duration>,
}

impl DispatchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            destination: config.destination.clone(),
            segment_limit: config.dispatch.segment_limit,
            auto_reset: Duration::from_secs(config.dispatch.auto_reset_secs),
            acquisition_timeout: match config.dispatch.acquisition_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// External collaborators the workflow drives.
#[derive(Clone)]
pub struct Collaborators {
    pub capabilities: Arc<dyn CapabilityProvider>,
    pub positioning: Arc<dyn PositioningProvider>,
    pub transport: Arc<dyn MessagingTransport>,
}

/// User intents forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    UpdateDestination(String),
    Submit,
    Locate,
    DismissResult,
    DismissError,
    DismissPermissionPrompt,
    CapabilityGrantEvent,
}

/// How the controller answered an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Applied,
    Started { attempt: Uuid },
    /// An attempt is already in flight.
    Ignored,
    Rejected { message: String },
}

struct Request {
    intent: Intent,
    reply: oneshot::Sender<Ack>,
}

enum Plan {
    Send(Destination),
    Locate,
}

enum Progress {
    Acquired(Position),
    Located(Position),
    Sent { destination: String, segments: usize },
    Failed(String),
}

struct Report {
    attempt: Uuid,
    progress: Progress,
}

struct InFlight {
    attempt: Uuid,
    task: JoinHandle<()>,
}

enum Wake {
    Request(Request),
    Report(Report),
    Joined(Uuid, Result<(), JoinError>),
    ResetDue,
}

pub struct DispatchController {
    settings: DispatchSettings,
    gate: CapabilityGate,
    location: LocationService,
    transport: Arc<dyn MessagingTransport>,
    state: WorkflowState,
    state_tx: watch::Sender<WorkflowState>,
    events: EventSender,
    requests: mpsc::Receiver<Request>,
    reports_tx: mpsc::UnboundedSender<Report>,
    reports: mpsc::UnboundedReceiver<Report>,
    in_flight: Option<InFlight>,
    reset: ResetTimer,
    shutdown: CancellationToken,
}

impl DispatchController {
    /// Start a controller task and return a handle to it.
    pub fn spawn(settings: DispatchSettings, collaborators: Collaborators) -> DispatchHandle {
        let gate = CapabilityGate::new(collaborators.capabilities);
        let mut state = WorkflowState::default();
        state.set_capabilities(gate.query());

        let (state_tx, state_rx) = watch::channel(state.clone());
        let (requests_tx, requests) = mpsc::channel(REQUEST_QUEUE);
        let (reports_tx, reports) = mpsc::unbounded_channel();
        let (events, _) = event_bus(EVENT_CAPACITY);
        let shutdown = CancellationToken::new();

        let controller = Self {
            location: LocationService::new(collaborators.positioning, settings.acquisition_timeout),
            reset: ResetTimer::new(settings.auto_reset),
            settings,
            gate,
            transport: collaborators.transport,
            state,
            state_tx,
            events: events.clone(),
            requests,
            reports_tx,
            reports,
            in_flight: None,
            shutdown: shutdown.clone(),
        };
        tokio::spawn(controller.run());

        DispatchHandle {
            requests: requests_tx,
            state: state_rx,
            events,
            shutdown,
        }
    }

    async fn run(mut self) {
        info!(
            transport = self.transport.name(),
            positioning = self.location.provider_name(),
            "dispatch controller started"
        );

        loop {
            let reset_due = self.reset.expired();
            let wake = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                Some(report) = self.reports.recv() => Wake::Report(report),
                (attempt, joined) = join_in_flight(&mut self.in_flight) => {
                    Wake::Joined(attempt, joined)
                }
                request = self.requests.recv() => match request {
                    Some(request) => Wake::Request(request),
                    None => break,
                },
                () = reset_due => Wake::ResetDue,
            };

            let reply = match wake {
                Wake::Request(request) => Some((request.reply, self.apply(request.intent))),
                Wake::Report(report) => {
                    self.on_report(report);
                    None
                }
                Wake::Joined(attempt, joined) => {
                    self.on_joined(attempt, joined);
                    None
                }
                Wake::ResetDue => {
                    self.on_reset_due();
                    None
                }
            };
            self.publish();
            if let Some((reply, ack)) = reply {
                let _ = reply.send(ack);
            }
        }

        if let Some(in_flight) = self.in_flight.take() {
            debug!(attempt = %in_flight.attempt, "abandoning in-flight attempt on shutdown");
            in_flight.task.abort();
        }
        info!("dispatch controller stopped");
    }

    fn publish(&self) {
        debug_assert!(self.state.is_consistent(), "{:?}", self.state);
        let next = &self.state;
        self.state_tx.send_if_modified(|current| {
            if current == next {
                false
            } else {
                current.clone_from(next);
                true
            }
        });
    }

    fn emit(&self, event: DispatchEvent) {
        let _ = self.events.send(event);
    }

    // ── Intents ─────────────────────────────────────────────────────────

    fn apply(&mut self, intent: Intent) -> Ack {
        match intent {
            Intent::UpdateDestination(text) => {
                self.update_destination(text);
                Ack::Applied
            }
            Intent::Submit => self.start(AttemptKind::Send),
            Intent::Locate => self.start(AttemptKind::Locate),
            Intent::DismissResult => {
                if self.state.success_message.is_some() {
                    self.clear_success(false);
                }
                Ack::Applied
            }
            Intent::DismissError => {
                self.state.error_message = None;
                if self.state.phase == Phase::Failed {
                    self.state.phase = Phase::Idle;
                }
                Ack::Applied
            }
            Intent::DismissPermissionPrompt => {
                self.state.permission_prompt = false;
                Ack::Applied
            }
            Intent::CapabilityGrantEvent => {
                let set = self.gate.query();
                info!(
                    positioning = set.positioning,
                    messaging = set.messaging,
                    "capabilities refreshed"
                );
                self.state.set_capabilities(set);
                self.state.permission_prompt = false;
                Ack::Applied
            }
        }
    }

    fn update_destination(&mut self, text: String) {
        let validation = validator::validate(&text, &self.settings.destination);
        self.state.destination_valid = validation.is_valid();
        self.state.destination_error = validation.reason();
        self.state.destination = text;
    }

    fn start(&mut self, kind: AttemptKind) -> Ack {
        if self.state.phase.is_in_flight() {
            debug!(%kind, phase = %self.state.phase, "attempt already in flight, ignoring");
            return Ack::Ignored;
        }

        let required = match kind {
            AttemptKind::Send => CapabilityGate::SEND,
            AttemptKind::Locate => CapabilityGate::LOCATE,
        };
        let granted = self.gate.query();
        self.state.set_capabilities(granted);
        if let Err(missing) = granted.require(required) {
            self.state.permission_prompt = true;
            return self.reject(capability_message(&missing));
        }

        let plan = match kind {
            AttemptKind::Locate => Plan::Locate,
            AttemptKind::Send => {
                match validator::validate(&self.state.destination, &self.settings.destination)
                    .outcome
                {
                    Ok(destination) => Plan::Send(destination),
                    Err(_) => return self.reject("Invalid phone number".to_string()),
                }
            }
        };

        let attempt = Uuid::new_v4();
        self.reset.cancel();
        self.state.clear_result();
        self.state.phase = Phase::AcquiringLocation;
        self.state.acquiring_location = true;

        let job = Attempt {
            id: attempt,
            plan,
            location: self.location.clone(),
            transport: Arc::clone(&self.transport),
            segment_limit: self.settings.segment_limit,
            report: self.reports_tx.clone(),
        };
        let task = tokio::spawn(job.run(self.shutdown.child_token()));
        self.in_flight = Some(InFlight { attempt, task });

        info!(%attempt, %kind, "dispatch attempt started");
        self.emit(DispatchEvent::AttemptStarted {
            attempt,
            mode: kind,
        });
        Ack::Started { attempt }
    }

    fn reject(&mut self, message: String) -> Ack {
        warn!(reason = %message, "dispatch rejected");
        if self.state.phase == Phase::Succeeded {
            self.clear_success(false);
        }
        self.state.success_message = None;
        self.state.error_message = Some(message.clone());
        self.emit(DispatchEvent::SubmitRejected {
            message: message.clone(),
        });
        Ack::Rejected { message }
    }

    fn clear_success(&mut self, automatic: bool) {
        self.reset.cancel();
        self.state.success_message = None;
        self.state.position = None;
        if self.state.phase == Phase::Succeeded {
            self.state.phase = Phase::Idle;
        }
        self.emit(DispatchEvent::ResultCleared { automatic });
    }

    // ── Attempt progress ────────────────────────────────────────────────

    fn on_report(&mut self, report: Report) {
        let current = self.in_flight.as_ref().map(|f| f.attempt);
        if current != Some(report.attempt) {
            debug!(attempt = %report.attempt, "dropping report from stale attempt");
            return;
        }
        let attempt = report.attempt;

        match report.progress {
            Progress::Acquired(position) => {
                info!(%attempt, %position, "location acquired, transmitting");
                self.state.acquiring_location = false;
                self.state.transmitting = true;
                self.state.position = Some(position);
                self.state.phase = Phase::Transmitting;
                self.emit(DispatchEvent::LocationAcquired {
                    attempt,
                    latitude: position.latitude(),
                    longitude: position.longitude(),
                });
            }
            Progress::Located(position) => {
                info!(%attempt, %position, "location acquired");
                self.state.acquiring_location = false;
                self.state.position = Some(position);
                self.state.success_message = Some(format!("Location acquired: {position}"));
                self.state.phase = Phase::Succeeded;
                self.reset.arm();
                self.emit(DispatchEvent::LocationAcquired {
                    attempt,
                    latitude: position.latitude(),
                    longitude: position.longitude(),
                });
            }
            Progress::Sent {
                destination,
                segments,
            } => {
                info!(%attempt, %destination, segments, "location sent");
                let coordinates = self.state.position.map_or_else(String::new, |p| {
                    format!(
                        "\nLAT: {}, LON: {}",
                        encoder::format_coordinate(p.latitude()),
                        encoder::format_coordinate(p.longitude())
                    )
                });
                self.state.transmitting = false;
                self.state.success_message =
                    Some(format!("SMS sent to {destination}{coordinates}"));
                self.state.phase = Phase::Succeeded;
                self.state.destination.clear();
                self.state.destination_valid = false;
                self.state.destination_error = None;
                self.reset.arm();
                self.emit(DispatchEvent::MessageSent {
                    attempt,
                    destination,
                    segments,
                });
            }
            Progress::Failed(message) => {
                warn!(%attempt, error = %message, "dispatch attempt failed");
                self.fail(attempt, message);
            }
        }
    }

    fn fail(&mut self, attempt: Uuid, message: String) {
        self.state.acquiring_location = false;
        self.state.transmitting = false;
        self.state.position = None;
        self.state.success_message = None;
        self.state.error_message = Some(message.clone());
        self.state.phase = Phase::Failed;
        self.emit(DispatchEvent::AttemptFailed { attempt, message });
    }

    fn on_joined(&mut self, attempt: Uuid, joined: Result<(), JoinError>) {
        // The task may exit before its last report is polled; anything it
        // sent is already queued and must be applied before judging the exit.
        while let Ok(report) = self.reports.try_recv() {
            self.on_report(report);
        }
        self.in_flight = None;
        if !self.state.phase.is_in_flight() {
            return;
        }
        let message = match joined {
            Err(err) if err.is_panic() => "Internal error while sending location".to_string(),
            Err(_) | Ok(()) => "Location request was cancelled".to_string(),
        };
        warn!(%attempt, error = %message, "attempt ended without a result");
        self.fail(attempt, message);
    }

    fn on_reset_due(&mut self) {
        if self.reset.fire() && self.state.phase == Phase::Succeeded {
            info!(after = ?self.reset.delay(), "clearing displayed result");
            self.clear_success(true);
        }
    }
}

async fn join_in_flight(in_flight: &mut Option<InFlight>) -> (Uuid, Result<(), JoinError>) {
    match in_flight {
        Some(in_flight) => (in_flight.attempt, (&mut in_flight.task).await),
        None => std::future::pending().await,
    }
}

fn capability_message(missing: &CapabilityMissing) -> String {
    let positioning = missing.missing.contains(&Capability::Positioning);
    let messaging = missing.missing.contains(&Capability::Messaging);
    match (positioning, messaging) {
        (true, true) => "Location and SMS permissions are required".to_string(),
        (true, false) => "Location permission is required".to_string(),
        _ => "SMS permission is required".to_string(),
    }
}

fn acquisition_message(err: &AcquisitionError) -> String {
    match err {
        AcquisitionError::NoFixAvailable => {
            "Could not get GPS location. Check that GPS is enabled.".to_string()
        }
        AcquisitionError::PermissionRevoked => {
            "Location permission was revoked while getting the location".to_string()
        }
        AcquisitionError::TimedOut(limit) => format!(
            "Could not get GPS location within {}s. Check that GPS is enabled.",
            limit.as_secs()
        ),
        AcquisitionError::Provider(cause) => format!("Error getting location: {cause:#}"),
    }
}

fn transmission_error(transport: &str, err: anyhow::Error) -> TransmissionError {
    match err.downcast::<TransmissionError>() {
        Ok(typed) => typed,
        Err(cause) => TransmissionError::Failed {
            transport: transport.to_string(),
            cause,
        },
    }
}

fn transmission_message(err: &TransmissionError) -> String {
    match err {
        TransmissionError::Rejected { message, .. } => format!("Failed to send SMS: {message}"),
        TransmissionError::Failed { cause, .. } => format!("Failed to send SMS: {cause:#}"),
    }
}

/// One dispatch attempt, run on its own task.
struct Attempt {
    id: Uuid,
    plan: Plan,
    location: LocationService,
    transport: Arc<dyn MessagingTransport>,
    segment_limit: usize,
    report: mpsc::UnboundedSender<Report>,
}

impl Attempt {
    fn report(&self, progress: Progress) {
        let _ = self.report.send(Report {
            attempt: self.id,
            progress,
        });
    }

    async fn run(self, cancel: CancellationToken) {
        let position = match self.location.acquire(&cancel).await {
            Ok(Cancellable::Completed(position)) => position,
            Ok(Cancellable::Cancelled) => return,
            Err(err) => {
                self.report(Progress::Failed(acquisition_message(&err)));
                return;
            }
        };

        let destination = match &self.plan {
            Plan::Locate => {
                self.report(Progress::Located(position));
                return;
            }
            Plan::Send(destination) => destination,
        };
        self.report(Progress::Acquired(position));

        let limit = self
            .segment_limit
            .min(self.transport.max_message_length());
        let message = encoder::encode(&position, Utc::now(), limit);
        debug!(
            attempt = %self.id,
            segments = message.segments().len(),
            "encoded location message"
        );

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            outcome = self
                .transport
                .send(destination.international(), message.segments()) => outcome,
        };

        match outcome {
            Ok(()) => self.report(Progress::Sent {
                destination: destination.international().to_string(),
                segments: message.segments().len(),
            }),
            Err(err) => {
                let err = transmission_error(self.transport.name(), err);
                self.report(Progress::Failed(transmission_message(&err)));
            }
        }
    }
}

/// Cloneable front end for a running [`DispatchController`].
#[derive(Clone)]
pub struct DispatchHandle {
    requests: mpsc::Sender<Request>,
    state: watch::Receiver<WorkflowState>,
    events: EventSender,
    shutdown: CancellationToken,
}

impl DispatchHandle {
    pub async fn request(&self, intent: Intent) -> Result<Ack, HandleError> {
        let (reply, ack) = oneshot::channel();
        self.requests
            .send(Request { intent, reply })
            .await
            .map_err(|_| HandleError::Closed)?;
        ack.await.map_err(|_| HandleError::Closed)
    }

    pub async fn update_destination(&self, text: impl Into<String>) -> Result<(), HandleError> {
        self.request(Intent::UpdateDestination(text.into()))
            .await
            .map(drop)
    }

    pub async fn submit(&self) -> Result<Ack, HandleError> {
        self.request(Intent::Submit).await
    }

    pub async fn locate(&self) -> Result<Ack, HandleError> {
        self.request(Intent::Locate).await
    }

    pub async fn dismiss_result(&self) -> Result<(), HandleError> {
        self.request(Intent::DismissResult).await.map(drop)
    }

    pub async fn dismiss_error(&self) -> Result<(), HandleError> {
        self.request(Intent::DismissError).await.map(drop)
    }

    pub async fn dismiss_permission_prompt(&self) -> Result<(), HandleError> {
        self.request(Intent::DismissPermissionPrompt).await.map(drop)
    }

    pub async fn on_capability_grant_event(&self) -> Result<(), HandleError> {
        self.request(Intent::CapabilityGrantEvent).await.map(drop)
    }

    /// Latest published state.
    pub fn snapshot(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.clone()
    }

    pub fn events(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&WorkflowState) -> bool,
    ) -> Result<WorkflowState, HandleError> {
        let mut state = self.state.clone();
        let matched = state
            .wait_for(predicate)
            .await
            .map_err(|_| HandleError::Closed)?
            .clone();
        Ok(matched)
    }

    /// Wait until no attempt is in flight and return that state.
    pub async fn settled(&self) -> Result<WorkflowState, HandleError> {
        self.wait_for(|state| !state.phase.is_in_flight()).await
    }

    /// Stop the controller and any in-flight attempt, then wait for it to exit.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.requests.closed().await;
    }
}
