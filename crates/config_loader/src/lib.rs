//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a ready-to-use `RecorderConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("recorder.toml")).unwrap();
//! println!("fps: {}", config.fps);
//! ```

mod parser;
mod validator;

pub use contracts::RecorderConfig;
pub use parser::ConfigFormat;

use contracts::RecorderError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RecorderConfig, RecorderError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Re-run validation on an already-loaded configuration
    ///
    /// Used after applying CLI overrides to a loaded configuration.
    ///
    /// # Errors
    /// - Validation failure
    pub fn validate(config: &RecorderConfig) -> Result<(), RecorderError> {
        validator::validate(config)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RecorderConfig, RecorderError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize RecorderConfig to TOML string
    pub fn to_toml(config: &RecorderConfig) -> Result<String, RecorderError> {
        toml::to_string_pretty(config)
            .map_err(|e| RecorderError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize RecorderConfig to JSON string
    pub fn to_json(config: &RecorderConfig) -> Result<String, RecorderError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| RecorderError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, RecorderError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            RecorderError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            RecorderError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, RecorderError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<RecorderConfig, RecorderError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
fps = 12
frame_tolerance = 1.2
batch_size = 50

[streams.primary]
id = "rgb"
kind = "image"
width = 640
height = 640

[streams.secondary]
id = "thermal"
kind = "array"
width = 80
height = 62

[output]
records_root = "./records"
timestamp_file = "timestamps.txt"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.fps, 12);
        assert_eq!(config.streams.primary.id, "rgb");
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.fps, config2.fps);
        assert_eq!(config.streams.primary.id, config2.streams.primary.id);
        assert_eq!(config.output.timestamp_file, config2.output.timestamp_file);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.fps, config2.fps);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Both streams sharing one id should fail validation
        let content = r#"
fps = 12

[streams.primary]
id = "cam"
kind = "image"

[streams.secondary]
id = "cam"
kind = "array"
width = 80
height = 62
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }
}
