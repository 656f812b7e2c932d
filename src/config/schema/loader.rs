use super::Config;
use crate::error::ConfigError;
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    /// Load `~/.sms-locator/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
        let locator_dir = home.join(".sms-locator");
        let config_path = locator_dir.join("config.toml");

        if !locator_dir.exists() {
            fs::create_dir_all(&locator_dir)?;
        }

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self {
                config_path,
                ..Self::default()
            };
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    /// Load an explicit config file. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("cannot read {}: {e}", path.display())))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("cannot parse {}: {e}", path.display())))?;
        config.config_path = path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("cannot serialize config: {e}")))?;
        if let Some(parent) = self.config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PositioningBackend, TransportBackend};

    #[test]
    fn load_from_fills_missing_sections_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dispatch]\nsegment_limit = 70\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.dispatch.segment_limit, 70);
        assert_eq!(config.dispatch.auto_reset_secs, 5);
        assert_eq!(config.destination.country_code, "57");
        assert_eq!(config.positioning.backend, PositioningBackend::Fixed);
        assert_eq!(config.transport.backend, TransportBackend::Console);
        assert_eq!(config.config_path, path);
    }

    #[test]
    fn load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dispatch]\nsegment_limit = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("segment_limit"));
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dispatch\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
        assert!(err.to_string().contains("cannot parse"));
    }

    #[test]
    fn load_from_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn save_into_a_file_path_reports_io() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let config = Config {
            config_path: blocker.join("config.toml"),
            ..Config::default()
        };

        let err = config.save().unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config {
            config_path: dir.path().join("nested").join("config.toml"),
            ..Config::default()
        };
        config.transport.backend = TransportBackend::Http;
        config.transport.endpoint = Some("https://sms.example.com/send".into());
        config.positioning.latitude = 4.71;
        config.positioning.longitude = -74.0721;
        config.save().unwrap();

        let loaded = Config::load_from(&config.config_path).unwrap();
        assert_eq!(loaded.transport.backend, TransportBackend::Http);
        assert_eq!(
            loaded.transport.endpoint.as_deref(),
            Some("https://sms.example.com/send")
        );
        assert!((loaded.positioning.latitude - 4.71).abs() < f64::EPSILON);
    }
}
