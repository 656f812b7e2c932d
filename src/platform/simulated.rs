//! In-process collaborators: grant toggles, a scripted positioning source and
//! a transport that records what it was asked to send.
//!
//! The CLI uses them when no hardware is configured; tests use them to drive
//! every branch of the workflow.

use super::traits::{
    Accuracy, CapabilityProvider, MessagingTransport, PositioningProvider, ProviderFault,
};
use crate::dispatch::capability::{Capability, CapabilitySet};
use crate::dispatch::location::Position;
use crate::error::TransmissionError;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Lock `mutex`, keeping its data if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("simulated collaborator lock poisoned, using its last value");
        poisoned.into_inner()
    })
}

// ─── Capabilities ───────────────────────────────────────────────────────────

/// Capability grants that can be flipped at runtime.
#[derive(Debug)]
pub struct SimulatedCapabilities {
    positioning: AtomicBool,
    messaging: AtomicBool,
}

impl SimulatedCapabilities {
    pub fn new(initial: CapabilitySet) -> Self {
        Self {
            positioning: AtomicBool::new(initial.positioning),
            messaging: AtomicBool::new(initial.messaging),
        }
    }

    fn flag(&self, capability: Capability) -> &AtomicBool {
        match capability {
            Capability::Positioning => &self.positioning,
            Capability::Messaging => &self.messaging,
        }
    }

    pub fn grant(&self, capability: Capability) {
        self.flag(capability).store(true, Ordering::SeqCst);
    }

    pub fn revoke(&self, capability: Capability) {
        self.flag(capability).store(false, Ordering::SeqCst);
    }
}

impl CapabilityProvider for SimulatedCapabilities {
    fn is_granted(&self, capability: Capability) -> bool {
        self.flag(capability).load(Ordering::SeqCst)
    }
}

// ─── Positioning ────────────────────────────────────────────────────────────

/// What a [`ScriptedPositioning`] answers with.
#[derive(Debug, Clone)]
pub enum FixScript {
    Fix(Position),
    NoFix,
    PermissionDenied,
    Error(String),
}

#[derive(Debug)]
pub struct ScriptedPositioning {
    script: Mutex<FixScript>,
    delay: Duration,
    requests: AtomicUsize,
    completed: AtomicUsize,
}

impl ScriptedPositioning {
    pub fn new(script: FixScript) -> Self {
        Self {
            script: Mutex::new(script),
            delay: Duration::ZERO,
            requests: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    /// Answer only after `delay` has elapsed.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_script(&self, script: FixScript) {
        *lock(&self.script) = script;
    }

    /// Number of fix requests issued.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of requests that ran to completion (were not dropped).
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl PositioningProvider for ScriptedPositioning {
    fn name(&self) -> &str {
        "simulated"
    }

    fn request_current_fix<'a>(
        &'a self,
        _accuracy: Accuracy,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Position>, ProviderFault>> + Send + 'a>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.completed.fetch_add(1, Ordering::SeqCst);

            let script = lock(&self.script).clone();
            match script {
                FixScript::Fix(position) => Ok(Some(position)),
                FixScript::NoFix => Ok(None),
                FixScript::PermissionDenied => Err(ProviderFault::PermissionDenied),
                FixScript::Error(message) => Err(ProviderFault::Other(anyhow::anyhow!(message))),
            }
        })
    }
}

// ─── Transport ──────────────────────────────────────────────────────────────

/// One recorded call to [`RecordingTransport::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub destination: String,
    pub segments: Vec<String>,
}

#[derive(Debug, Clone)]
enum SendScript {
    Deliver,
    Reject(String),
    Fail(String),
}

/// Transport that keeps every message it is handed.
#[derive(Debug)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentMessage>>,
    script: SendScript,
    delay: Duration,
    max_length: usize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            script: SendScript::Deliver,
            delay: Duration::ZERO,
            max_length: usize::MAX,
        }
    }

    /// Refuse every message with `reason`, as a carrier would.
    pub fn rejecting(reason: &str) -> Self {
        Self {
            script: SendScript::Reject(reason.to_string()),
            ..Self::new()
        }
    }

    /// Fail every send with an I/O-style error.
    pub fn failing(message: &str) -> Self {
        Self {
            script: SendScript::Fail(message.to_string()),
            ..Self::new()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }
}

impl MessagingTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    fn max_message_length(&self) -> usize {
        self.max_length
    }

    fn send<'a>(
        &'a self,
        destination: &'a str,
        segments: &'a [String],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.script {
                SendScript::Deliver => {}
                SendScript::Reject(reason) => {
                    return Err(TransmissionError::Rejected {
                        transport: self.name().to_string(),
                        message: reason.clone(),
                    }
                    .into());
                }
                SendScript::Fail(message) => anyhow::bail!("{message}"),
            }
            lock(&self.sent).push(SentMessage {
                destination: destination.to_string(),
                segments: segments.to_vec(),
            });
            Ok(())
        })
    }
}
