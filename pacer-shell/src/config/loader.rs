//! Configuration loading
//!
//! Loads the engine configuration from a TOML file, falling back to a
//! stored postcard blob, then to the built-in defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str;

use pacer_core::config::{ConfigError, EngineConfig, StoredConfig, MAX_STORED_CONFIG_SIZE};
use tracing::{debug, info, warn};

/// Configuration loading errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read or written
    #[error("i/o error: {0}")]
    Io(io::ErrorKind),
    /// Invalid UTF-8 in TOML data
    #[error("config is not valid UTF-8")]
    InvalidUtf8,
    /// TOML parsing failed
    #[error("config is not valid TOML: {0}")]
    TomlParse(String),
    /// The values were parsed but are not usable
    #[error("invalid config: {0}")]
    Config(ConfigError),
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Config(e)
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e.kind())
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Toml,
    Stored,
    Defaults,
}

impl ConfigSource {
    pub fn label(&self) -> &'static str {
        match self {
            ConfigSource::Toml => "toml",
            ConfigSource::Stored => "stored",
            ConfigSource::Defaults => "defaults",
        }
    }
}

/// Parse and validate TOML text
///
/// Missing tables and keys take their default values.
pub fn parse_config(text: &str) -> Result<EngineConfig, LoadError> {
    let config: EngineConfig =
        toml::from_str(text).map_err(|e| LoadError::TomlParse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Configuration loader
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    toml_path: Option<PathBuf>,
    stored_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a TOML file as the primary source
    pub fn with_toml(mut self, path: impl Into<PathBuf>) -> Self {
        self.toml_path = Some(path.into());
        self
    }

    /// Use a stored blob as the fallback source
    pub fn with_stored(mut self, path: impl Into<PathBuf>) -> Self {
        self.stored_path = Some(path.into());
        self
    }

    /// Load configuration
    ///
    /// A TOML file that exists but cannot be used is an error. A missing
    /// TOML file falls through to the stored blob, and a missing or corrupt
    /// blob falls through to the defaults.
    pub fn load(&self) -> Result<(EngineConfig, ConfigSource), LoadError> {
        if let Some(path) = &self.toml_path {
            match load_toml(path) {
                Ok(config) => {
                    info!(path = %path.display(), "Loaded configuration from TOML");
                    return Ok((config, ConfigSource::Toml));
                }
                Err(LoadError::Io(io::ErrorKind::NotFound)) => {
                    warn!(path = %path.display(), "TOML config not found, trying stored config");
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(path) = &self.stored_path {
            match load_stored(path) {
                Ok(config) => {
                    info!(path = %path.display(), "Loaded stored configuration");
                    return Ok((config, ConfigSource::Stored));
                }
                Err(LoadError::Io(io::ErrorKind::NotFound)) => {
                    debug!(path = %path.display(), "No stored config found");
                }
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "Ignoring stored config");
                }
            }
        }

        info!("Using default configuration");
        Ok((EngineConfig::default(), ConfigSource::Defaults))
    }
}

/// Load and validate a TOML file
pub fn load_toml(path: &Path) -> Result<EngineConfig, LoadError> {
    let bytes = fs::read(path)?;
    debug!(bytes = bytes.len(), "Read TOML config");

    let text = str::from_utf8(&bytes).map_err(|_| LoadError::InvalidUtf8)?;
    parse_config(text)
}

/// Load and verify a stored blob
pub fn load_stored(path: &Path) -> Result<EngineConfig, LoadError> {
    let bytes = fs::read(path)?;
    debug!(bytes = bytes.len(), "Read stored config");

    Ok(StoredConfig::decode(&bytes)?)
}

/// Write `config` as a stored blob
pub fn save_stored(path: &Path, config: &EngineConfig) -> Result<(), LoadError> {
    config.validate()?;

    let stored = StoredConfig::new(*config)?;
    let mut buf = [0u8; MAX_STORED_CONFIG_SIZE];
    let bytes = stored.encode(&mut buf)?;

    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacer_core::config::DEFAULT_REFRACTORY_MS;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pacer-shell-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = parse_config(
            r#"
goal_steps = 10000

[counter]
step_increment = 1000

[detector]
step_threshold = 1.5
"#,
        )
        .unwrap();

        assert_eq!(config.goal_steps, 10_000);
        assert_eq!(config.counter.step_increment, 1000);
        assert_eq!(config.counter.start_value, 0);
        assert_eq!(config.detector.step_threshold, 1.5);
        assert_eq!(config.detector.refractory_ms, DEFAULT_REFRACTORY_MS);
    }

    #[test]
    fn test_bundled_demo_config() {
        let config = parse_config(include_str!("../../config/demo.toml")).unwrap();
        assert_eq!(config.counter.step_increment, 1000);
        assert_eq!(config.goal_steps, 10_000);
        assert_eq!(config.detector, EngineConfig::default().detector);
    }

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(parse_config("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert_eq!(
            parse_config("[detector]\nsmoothing_alpha = 1.0\n"),
            Err(LoadError::Config(ConfigError::InvalidSmoothing))
        );
        assert_eq!(
            parse_config("[counter]\nstep_increment = 0\n"),
            Err(LoadError::Config(ConfigError::InvalidIncrement))
        );
        assert!(matches!(
            parse_config("goal_steps = \"many\"\n"),
            Err(LoadError::TomlParse(_))
        ));
    }

    #[test]
    fn test_load_prefers_toml() {
        let toml_path = temp_path("prefers.toml");
        let stored_path = temp_path("prefers.bin");
        fs::write(&toml_path, "goal_steps = 50\n").unwrap();

        let mut stored = EngineConfig::default();
        stored.goal_steps = 70;
        save_stored(&stored_path, &stored).unwrap();

        let loader = ConfigLoader::new()
            .with_toml(&toml_path)
            .with_stored(&stored_path);
        let (config, source) = loader.load().unwrap();
        assert_eq!(source, ConfigSource::Toml);
        assert_eq!(config.goal_steps, 50);

        fs::remove_file(&toml_path).unwrap();
        let (config, source) = loader.load().unwrap();
        assert_eq!(source, ConfigSource::Stored);
        assert_eq!(config.goal_steps, 70);

        fs::remove_file(&stored_path).unwrap();
    }

    #[test]
    fn test_broken_toml_is_an_error() {
        let toml_path = temp_path("broken.toml");
        let stored_path = temp_path("broken.bin");
        fs::write(&toml_path, "goal_steps = [\n").unwrap();
        save_stored(&stored_path, &EngineConfig::default()).unwrap();

        // The stored blob must not mask an explicit TOML file
        let result = ConfigLoader::new()
            .with_toml(&toml_path)
            .with_stored(&stored_path)
            .load();
        let err = result.unwrap_err();
        assert!(matches!(err, LoadError::TomlParse(_)));
        assert!(err.to_string().starts_with("config is not valid TOML: "));

        fs::write(&toml_path, "[counter]\nstep_increment = 0\n").unwrap();
        assert_eq!(
            ConfigLoader::new().with_toml(&toml_path).load(),
            Err(LoadError::Config(ConfigError::InvalidIncrement))
        );

        fs::remove_file(&toml_path).unwrap();
        fs::remove_file(&stored_path).unwrap();
    }

    #[test]
    fn test_corrupt_stored_rejected() {
        let path = temp_path("corrupt.bin");
        save_stored(&path, &EngineConfig::default()).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        assert!(load_stored(&path).is_err());
        let (_, source) = ConfigLoader::new().with_stored(&path).load().unwrap();
        assert_eq!(source, ConfigSource::Defaults);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_files() {
        assert_eq!(
            load_toml(&temp_path("missing.toml")),
            Err(LoadError::Io(io::ErrorKind::NotFound))
        );
        let (_, source) = ConfigLoader::new()
            .with_toml(temp_path("missing.toml"))
            .with_stored(temp_path("missing.bin"))
            .load()
            .unwrap();
        assert_eq!(source, ConfigSource::Defaults);
    }
}
