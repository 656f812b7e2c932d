use super::{Config, PositioningBackend, TransportBackend};
use crate::dispatch::location::{MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
use crate::error::ConfigError;

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

impl Config {
    /// Reject settings the dispatch workflow cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let destination = &self.destination;
        if !all_digits(&destination.country_code) {
            return Err(ConfigError::Validation(format!(
                "destination.country_code must be digits, got {:?}",
                destination.country_code
            )));
        }
        if destination.national_digits == 0 {
            return Err(ConfigError::Validation(
                "destination.national_digits must be greater than 0".into(),
            ));
        }
        if !all_digits(&destination.leading_digit)
            || destination.leading_digit.len() > destination.national_digits
        {
            return Err(ConfigError::Validation(format!(
                "destination.leading_digit must be at most {} digits, got {:?}",
                destination.national_digits, destination.leading_digit
            )));
        }

        if self.dispatch.segment_limit == 0 {
            return Err(ConfigError::Validation(
                "dispatch.segment_limit must be greater than 0".into(),
            ));
        }

        if self.positioning.backend == PositioningBackend::Fixed {
            let (lat, lon) = (self.positioning.latitude, self.positioning.longitude);
            if !(MIN_LAT..=MAX_LAT).contains(&lat) || !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(ConfigError::Validation(format!(
                    "positioning fixed coordinates out of range: {lat}, {lon}"
                )));
            }
        }

        if self.transport.backend == TransportBackend::Http {
            let endpoint = self.transport.endpoint.as_deref().ok_or_else(|| {
                ConfigError::Validation("transport.endpoint is required for http".into())
            })?;
            let parsed = url::Url::parse(endpoint).map_err(|e| {
                ConfigError::Validation(format!("transport.endpoint {endpoint:?}: {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Validation(format!(
                    "transport.endpoint must be http or https, got {}",
                    parsed.scheme()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(config: &Config) -> String {
        match config.validate() {
            Err(ConfigError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_digit_country_code() {
        let mut config = Config::default();
        config.destination.country_code = "+57".into();
        assert!(rejected(&config).contains("country_code"));
    }

    #[test]
    fn rejects_zero_national_digits() {
        let mut config = Config::default();
        config.destination.national_digits = 0;
        assert!(rejected(&config).contains("national_digits"));
    }

    #[test]
    fn rejects_bad_leading_digit() {
        let mut config = Config::default();
        config.destination.leading_digit = "x".into();
        assert!(rejected(&config).contains("leading_digit"));
    }

    #[test]
    fn rejects_zero_segment_limit() {
        let mut config = Config::default();
        config.dispatch.segment_limit = 0;
        assert!(rejected(&config).contains("segment_limit"));
    }

    #[test]
    fn rejects_out_of_range_fixed_position() {
        let mut config = Config::default();
        config.positioning.latitude = 91.0;
        assert!(rejected(&config).contains("out of range"));
    }

    #[test]
    fn gpsd_backend_ignores_fixed_coordinates() {
        let mut config = Config::default();
        config.positioning.backend = PositioningBackend::Gpsd;
        config.positioning.latitude = 500.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn http_transport_requires_endpoint() {
        let mut config = Config::default();
        config.transport.backend = TransportBackend::Http;
        assert!(rejected(&config).contains("required"));

        config.transport.endpoint = Some("not a url".into());
        assert!(rejected(&config).contains("transport.endpoint"));

        config.transport.endpoint = Some("ftp://gw.example.com".into());
        assert!(rejected(&config).contains("http or https"));

        config.transport.endpoint = Some("https://gw.example.com/v1/sms".into());
        assert!(config.validate().is_ok());
    }
}
