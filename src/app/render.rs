use crate::config::{Config, TransportBackend};
use crate::dispatch::encoder::{EncodedMessage, format_coordinate};
use crate::dispatch::location::Position;
use crate::dispatch::state::WorkflowState;
use crate::dispatch::validator::Validation;

fn granted(flag: bool) -> String {
    if flag {
        t!("render.granted").to_string()
    } else {
        t!("render.denied").to_string()
    }
}

pub fn render_position(position: &Position) -> String {
    format!(
        "LAT: {}, LON: {}",
        format_coordinate(position.latitude()),
        format_coordinate(position.longitude())
    )
}

pub fn render_validation(validation: &Validation) -> String {
    match &validation.outcome {
        Ok(destination) => format!(
            "✓ {}: {} → {}",
            t!("validate.valid"),
            destination.national(),
            destination.international()
        ),
        Err(err) => format!("✗ {}: {err}", t!("validate.invalid")),
    }
}

pub fn render_encoded(message: &EncodedMessage) -> String {
    let mut lines = vec![message.body().to_string(), String::new()];
    lines.push(t!("encode.segments", count = message.segments().len()).to_string());
    if message.is_multipart() {
        for (index, segment) in message.segments().iter().enumerate() {
            lines.push(format!("--- {}/{} ---", index + 1, message.segments().len()));
            lines.push(segment.clone());
        }
    }
    lines.join("\n")
}

/// One screen of workflow state.
pub fn render_state(state: &WorkflowState) -> String {
    let mut lines = vec![format!("◆ {} {}", t!("render.phase"), state.phase)];

    let destination = if state.destination.is_empty() {
        "-".to_string()
    } else if state.destination_valid {
        format!("{} ✓", state.destination)
    } else {
        format!("{} ✗", state.destination)
    };
    lines.push(format!("  {} {destination}", t!("render.destination")));
    if let Some(reason) = &state.destination_error {
        lines.push(format!("    {reason}"));
    }

    lines.push(format!(
        "  {} positioning={}, messaging={}",
        t!("render.capabilities"),
        granted(state.positioning_granted),
        granted(state.messaging_granted)
    ));

    if state.acquiring_location {
        lines.push(format!("  … {}", t!("render.acquiring")));
    }
    if state.transmitting {
        lines.push(format!("  … {}", t!("render.transmitting")));
    }
    if let Some(position) = &state.position {
        lines.push(format!("  {} {}", t!("render.position"), render_position(position)));
    }
    if let Some(success) = &state.success_message {
        lines.push(format!("  ✓ {}", success.replace('\n', "\n    ")));
    }
    if let Some(error) = &state.error_message {
        lines.push(format!("  ✗ {error}"));
    }
    if state.permission_prompt {
        lines.push(format!("  ! {}", t!("render.permission_prompt")));
    }

    lines.join("\n")
}

pub fn render_config(config: &Config) -> String {
    let mut lines = vec![
        format!("◆ {}", t!("config.title")),
        String::new(),
        format!("{}     {}", t!("config.version"), env!("CARGO_PKG_VERSION")),
        format!("{}      {}", t!("config.path"), config.config_path.display()),
        String::new(),
        format!(
            "  {}   +{} ({} digits, starts with {})",
            t!("config.destination"),
            config.destination.country_code,
            config.destination.national_digits,
            config.destination.leading_digit
        ),
        format!(
            "  {}   segment_limit={}, auto_reset={}s, acquisition_timeout={}",
            t!("config.dispatch"),
            config.dispatch.segment_limit,
            config.dispatch.auto_reset_secs,
            match config.dispatch.acquisition_timeout_secs {
                0 => "off".to_string(),
                secs => format!("{secs}s"),
            }
        ),
        format!(
            "  {}   {}",
            t!("config.positioning"),
            config.positioning.backend
        ),
        format!(
            "  {}   {}{}",
            t!("config.transport"),
            config.transport.backend,
            match (config.transport.backend, config.transport.endpoint.as_deref()) {
                (TransportBackend::Http, Some(endpoint)) => format!(" ({endpoint})"),
                _ => String::new(),
            }
        ),
        format!(
            "  {}   positioning={}, messaging={}",
            t!("config.capabilities"),
            granted(config.capabilities.positioning),
            granted(config.capabilities.messaging)
        ),
        format!(
            "  {}   {}",
            t!("config.log_level"),
            config.observability.log_level
        ),
    ];
    if config.transport.api_key.is_some() {
        lines.push(format!("  {}   ********", t!("config.api_key")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DestinationConfig;
    use crate::dispatch::state::Phase;
    use crate::dispatch::validator::validate;

    #[test]
    fn validation_shows_both_forms() {
        let rendered = render_validation(&validate("301 234 5678", &DestinationConfig::default()));
        assert!(rendered.contains("3012345678 → +573012345678"));
        assert!(rendered.starts_with('✓'));

        let rendered = render_validation(&validate("12345", &DestinationConfig::default()));
        assert!(rendered.starts_with('✗'));
        assert!(rendered.contains("10 digits"));
    }

    #[test]
    fn state_shows_position_and_messages() {
        let state = WorkflowState {
            phase: Phase::Succeeded,
            position: Some(Position::new(4.71, -74.0721).unwrap()),
            success_message: Some("SMS sent to +573012345678\nLAT: 4.710000".into()),
            permission_prompt: true,
            ..WorkflowState::default()
        };
        let rendered = render_state(&state);
        assert!(rendered.contains("succeeded"));
        assert!(rendered.contains("LAT: 4.710000, LON: -74.072100"));
        assert!(rendered.contains("✓ SMS sent to +573012345678\n    LAT: 4.710000"));
        assert!(rendered.contains("! "));
    }

    #[test]
    fn config_hides_api_key() {
        let mut config = Config::default();
        config.transport.api_key = Some("very-secret".into());
        let rendered = render_config(&config);
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("+57"));
    }
}
