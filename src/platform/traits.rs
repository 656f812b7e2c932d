use crate::dispatch::capability::Capability;
use crate::dispatch::location::Position;
use std::future::Future;
use std::pin::Pin;

/// Reports whether the platform currently grants a capability.
pub trait CapabilityProvider: Send + Sync {
    fn is_granted(&self, capability: Capability) -> bool;
}

/// Requested fix quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Accuracy {
    #[default]
    High,
    Balanced,
}

/// Why a positioning provider could not answer a fix request.
#[derive(Debug, thiserror::Error)]
pub enum ProviderFault {
    #[error("positioning permission denied")]
    PermissionDenied,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Source of single-shot position fixes.
///
/// Dropping the returned future cancels the request.
pub trait PositioningProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Request one current fix. `Ok(None)` means the provider answered but
    /// had no fix to report.
    fn request_current_fix<'a>(
        &'a self,
        accuracy: Accuracy,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Position>, ProviderFault>> + Send + 'a>>;
}

/// Core transport trait: implement for any short-message backend
pub trait MessagingTransport: Send + Sync {
    /// Human-readable transport name
    fn name(&self) -> &str;

    /// Deliver `segments` to `destination` in order. Multi-part framing, if
    /// the protocol needs any, is the transport's job.
    fn send<'a>(
        &'a self,
        destination: &'a str,
        segments: &'a [String],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Largest single segment the transport accepts, in characters.
    fn max_message_length(&self) -> usize {
        usize::MAX
    }
}
