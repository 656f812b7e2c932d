use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub destination: DestinationConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub capabilities: CapabilitiesConfig,

    #[serde(default)]
    pub positioning: PositioningConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_locale() -> String {
    "en".into()
}

/// Phone number rule for the destination field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// International dialling code without the `+`.
    #[serde(default = "default_country_code")]
    pub country_code: String,
    #[serde(default = "default_national_digits")]
    pub national_digits: usize,
    #[serde(default = "default_leading_digit")]
    pub leading_digit: String,
}

fn default_country_code() -> String {
    "57".into()
}

fn default_national_digits() -> usize {
    10
}

fn default_leading_digit() -> String {
    "3".into()
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            country_code: default_country_code(),
            national_digits: default_national_digits(),
            leading_digit: default_leading_digit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Seconds a success result stays on screen.
    #[serde(default = "default_auto_reset_secs")]
    pub auto_reset_secs: u64,
    /// Give up on a fix after this many seconds; 0 waits forever.
    #[serde(default = "default_acquisition_timeout_secs")]
    pub acquisition_timeout_secs: u64,
    /// Characters per transport segment.
    #[serde(default = "default_segment_limit")]
    pub segment_limit: usize,
}

fn default_auto_reset_secs() -> u64 {
    5
}

fn default_acquisition_timeout_secs() -> u64 {
    30
}

fn default_segment_limit() -> usize {
    crate::dispatch::encoder::DEFAULT_SEGMENT_LIMIT
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            auto_reset_secs: default_auto_reset_secs(),
            acquisition_timeout_secs: default_acquisition_timeout_secs(),
            segment_limit: default_segment_limit(),
        }
    }
}

/// Initial grants for the simulated capability provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitiesConfig {
    #[serde(default = "default_true")]
    pub positioning: bool,
    #[serde(default = "default_true")]
    pub messaging: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            positioning: true,
            messaging: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PositioningBackend {
    /// Always report `latitude`/`longitude`.
    #[default]
    Fixed,
    /// Read TPV reports from a gpsd daemon.
    Gpsd,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositioningConfig {
    #[serde(default)]
    pub backend: PositioningBackend,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default = "default_gpsd_addr")]
    pub gpsd_addr: String,
}

fn default_gpsd_addr() -> String {
    "127.0.0.1:2947".into()
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            backend: PositioningBackend::Fixed,
            latitude: 0.0,
            longitude: 0.0,
            gpsd_addr: default_gpsd_addr(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransportBackend {
    /// Print segments to stdout.
    #[default]
    Console,
    /// POST to an HTTP SMS gateway.
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub backend: TransportBackend,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_transport_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_transport_timeout_secs() -> u64 {
    15
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            backend: TransportBackend::Console,
            endpoint: None,
            api_key: None,
            timeout_secs: default_transport_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}
