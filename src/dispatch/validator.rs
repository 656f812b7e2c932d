//! Destination phone number validation.
//!
//! Pure and allocation-light so it can run on every keystroke.

use crate::config::DestinationConfig;
use crate::error::ValidationError;

/// A destination that passed validation, in national and international form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    national: String,
    international: String,
}

impl Destination {
    pub fn national(&self) -> &str {
        &self.national
    }

    /// `+<country code><national number>`, the form handed to the transport.
    pub fn international(&self) -> &str {
        &self.international
    }
}

/// Result of checking raw destination text against a [`DestinationConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub normalized: String,
    pub outcome: Result<Destination, ValidationError>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Field-level message; `None` when valid or when nothing has been typed.
    pub fn reason(&self) -> Option<String> {
        match &self.outcome {
            Err(ValidationError::Malformed { reason }) => Some(reason.clone()),
            Ok(_) | Err(ValidationError::Empty) => None,
        }
    }
}

/// Keep only ASCII digits.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

pub fn validate(raw: &str, rule: &DestinationConfig) -> Validation {
    let normalized = normalize(raw);

    let outcome = if raw.is_empty() {
        Err(ValidationError::Empty)
    } else if normalized.len() == rule.national_digits
        && normalized.starts_with(rule.leading_digit.as_str())
    {
        Ok(Destination {
            international: format!("+{}{normalized}", rule.country_code),
            national: normalized.clone(),
        })
    } else {
        Err(ValidationError::Malformed {
            reason: format!(
                "Invalid number. Must be a mobile number of {} digits starting with {}",
                rule.national_digits, rule.leading_digit
            ),
        })
    };

    Validation {
        normalized,
        outcome,
    }
}
