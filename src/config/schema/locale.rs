use super::Config;

const FALLBACK_LOCALE: &str = "en";

fn env_locale(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty() && value != "c" && value != "posix")
}

/// First usable value of `SMS_LOCATOR_LANG`, the config file (when not the
/// default), `LANG`, `LC_MESSAGES`; `"en"` otherwise.
fn detect_locale(config_locale: &str) -> String {
    let configured = Some(config_locale.trim().to_lowercase())
        .filter(|locale| !locale.is_empty() && locale != FALLBACK_LOCALE);

    env_locale("SMS_LOCATOR_LANG")
        .or(configured)
        .or_else(|| env_locale("LANG"))
        .or_else(|| env_locale("LC_MESSAGES"))
        .map_or_else(|| FALLBACK_LOCALE.to_string(), |raw| normalise_locale(&raw))
}

/// `"es_CO.UTF-8"` -> `"es"`, `"en-US"` -> `"en"`, `"es"` passes through.
fn normalise_locale(raw: &str) -> String {
    raw.split(['.', '@', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_string()
}

impl Config {
    /// Select the CLI message catalogue.
    pub fn apply_locale(&self) {
        let locale = detect_locale(&self.locale);
        tracing::debug!(locale = %locale, "applying locale");
        rust_i18n::set_locale(&locale);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_env::{ENV_LOCK, EnvVarGuard};
    use super::*;

    #[test]
    fn detect_locale_uses_expected_priority_order() {
        let _lock = ENV_LOCK.lock().unwrap();

        let _lang = EnvVarGuard::set("LANG", "pt_BR.UTF-8");
        let _lc_messages = EnvVarGuard::set("LC_MESSAGES", "de_DE.UTF-8");

        let override_lang = EnvVarGuard::set("SMS_LOCATOR_LANG", "es_CO.UTF-8");
        assert_eq!(detect_locale("fr_FR"), "es");
        drop(override_lang);
        let _override_unset = EnvVarGuard::unset("SMS_LOCATOR_LANG");

        assert_eq!(detect_locale("fr_FR"), "fr");
        assert_eq!(detect_locale("en"), "pt");

        let _lang_unset = EnvVarGuard::unset("LANG");
        assert_eq!(detect_locale("en"), "de");

        let _lc_messages_unset = EnvVarGuard::unset("LC_MESSAGES");
        assert_eq!(detect_locale("en"), "en");
    }

    #[test]
    fn posix_locale_falls_back_to_english() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _override = EnvVarGuard::unset("SMS_LOCATOR_LANG");
        let _lang = EnvVarGuard::set("LANG", "C");
        let _lc_messages = EnvVarGuard::unset("LC_MESSAGES");
        assert_eq!(detect_locale("en"), "en");
    }

    #[test]
    fn normalise_locale_handles_common_formats() {
        assert_eq!(normalise_locale("es_CO.UTF-8"), "es");
        assert_eq!(normalise_locale("en-US"), "en");
        assert_eq!(normalise_locale("en"), "en");
        assert_eq!(normalise_locale(""), "");
    }
}
