use super::Config;

impl Config {
    /// Apply `SMS_LOCATOR_*` environment overrides. Unparseable values are
    /// ignored so a stray variable never breaks startup.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(code) = std::env::var("SMS_LOCATOR_COUNTRY_CODE")
            && !code.is_empty()
        {
            self.destination.country_code = code.trim_start_matches('+').to_string();
        }

        if let Ok(limit_str) = std::env::var("SMS_LOCATOR_SEGMENT_LIMIT")
            && let Ok(limit) = limit_str.parse::<usize>()
            && limit > 0
        {
            self.dispatch.segment_limit = limit;
        }

        if let Ok(secs_str) = std::env::var("SMS_LOCATOR_AUTO_RESET_SECS")
            && let Ok(secs) = secs_str.parse::<u64>()
        {
            self.dispatch.auto_reset_secs = secs;
        }

        if let Ok(url) = std::env::var("SMS_LOCATOR_GATEWAY_URL")
            && !url.is_empty()
        {
            self.transport.endpoint = Some(url);
        }

        if let Ok(key) = std::env::var("SMS_LOCATOR_GATEWAY_KEY")
            && !key.is_empty()
        {
            self.transport.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("SMS_LOCATOR_LOG")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }
    }
}
