//! Single-shot position acquisition.
//!
//! [`LocationService::acquire`] issues exactly one high-accuracy request and
//! waits for its answer, a timeout, or cancellation. It never retries and
//! never polls for a better fix.

use crate::error::AcquisitionError;
use crate::platform::traits::{Accuracy, PositioningProvider, ProviderFault};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// An immutable latitude/longitude pair in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawPosition {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawPosition> for Position {
    type Error = PositionError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PositionError {
    #[error("latitude {0} outside [-90, 90]")]
    InvalidLatitude(f64),
    #[error("longitude {0} outside [-180, 180]")]
    InvalidLongitude(f64),
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, PositionError> {
        if !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(PositionError::InvalidLatitude(latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(PositionError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Outcome of an operation that may be cancelled at a suspension point.
#[derive(Debug, Clone, PartialEq)]
pub enum Cancellable<T> {
    Completed(T),
    Cancelled,
}

#[derive(Clone)]
pub struct LocationService {
    provider: Arc<dyn PositioningProvider>,
    timeout: Option<Duration>,
}

impl LocationService {
    pub fn new(provider: Arc<dyn PositioningProvider>, timeout: Option<Duration>) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn acquire(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Cancellable<Position>, AcquisitionError> {
        let request = self.provider.request_current_fix(Accuracy::High);
        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, request)
                    .await
                    .map_err(|_| AcquisitionError::TimedOut(limit)),
                None => Ok(request.await),
            }
        };

        let answer = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(provider = self.provider.name(), "position request cancelled");
                return Ok(Cancellable::Cancelled);
            }
            answer = bounded => answer?,
        };

        match answer {
            Ok(Some(position)) => Ok(Cancellable::Completed(position)),
            Ok(None) => Err(AcquisitionError::NoFixAvailable),
            Err(ProviderFault::PermissionDenied) => Err(AcquisitionError::PermissionRevoked),
            Err(ProviderFault::Other(cause)) => Err(AcquisitionError::Provider(cause)),
        }
    }
}
