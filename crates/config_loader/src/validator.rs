//! Configuration validation
//!
//! Rules:
//! - field ranges via the derive rules on `RecorderConfig` (fps 1..=25 etc.)
//! - stream ids distinct and non-empty
//! - safety_margin < coarse_sleep_threshold
//! - busy_wait_granularity <= safety_margin
//! - timestamp file name non-empty

use contracts::{RecorderConfig, RecorderError};
use validator::Validate;

/// Validate a parsed `RecorderConfig`.
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &RecorderConfig) -> Result<(), RecorderError> {
    validate_ranges(config)?;
    validate_streams(config)?;
    validate_timing(config)?;
    validate_output(config)?;
    Ok(())
}

/// Run the derive-based range rules
fn validate_ranges(config: &RecorderConfig) -> Result<(), RecorderError> {
    config.validate().map_err(|e| {
        let (field, errors) = e
            .field_errors()
            .into_iter()
            .next()
            .map(|(f, errs)| (f.to_string(), errs.clone()))
            .unwrap_or_default();
        let detail = errors
            .first()
            .map(|err| err.code.to_string())
            .unwrap_or_else(|| "invalid value".to_string());
        RecorderError::config_validation(field, detail)
    })
}

/// Stream ids must be non-empty and distinct
fn validate_streams(config: &RecorderConfig) -> Result<(), RecorderError> {
    let primary = &config.streams.primary;
    let secondary = &config.streams.secondary;

    if primary.id.is_empty() {
        return Err(RecorderError::config_validation(
            "streams.primary.id",
            "stream id cannot be empty",
        ));
    }
    if secondary.id.is_empty() {
        return Err(RecorderError::config_validation(
            "streams.secondary.id",
            "stream id cannot be empty",
        ));
    }
    if primary.id == secondary.id {
        return Err(RecorderError::config_validation(
            "streams.secondary.id",
            format!("duplicate stream id '{}'", secondary.id),
        ));
    }

    for (path, stream) in [("streams.primary", primary), ("streams.secondary", secondary)] {
        if stream.width == 0 || stream.height == 0 {
            return Err(RecorderError::config_validation(
                format!("{path}.width/height"),
                format!("dimensions must be > 0, got {}x{}", stream.width, stream.height),
            ));
        }
    }

    Ok(())
}

/// The hybrid wait only works if the phases nest: the coarse sleep must
/// leave a margin, and the fine poll must be able to fill that margin.
fn validate_timing(config: &RecorderConfig) -> Result<(), RecorderError> {
    let timing = &config.timing;

    if timing.safety_margin >= timing.coarse_sleep_threshold {
        return Err(RecorderError::config_validation(
            "timing.safety_margin",
            format!(
                "safety_margin ({}) must be < coarse_sleep_threshold ({})",
                timing.safety_margin, timing.coarse_sleep_threshold
            ),
        ));
    }

    if timing.busy_wait_granularity > timing.safety_margin {
        return Err(RecorderError::config_validation(
            "timing.busy_wait_granularity",
            format!(
                "busy_wait_granularity ({}) must be <= safety_margin ({})",
                timing.busy_wait_granularity, timing.safety_margin
            ),
        ));
    }

    Ok(())
}

fn validate_output(config: &RecorderConfig) -> Result<(), RecorderError> {
    if config.output.timestamp_file.is_empty() {
        return Err(RecorderError::config_validation(
            "output.timestamp_file",
            "timestamp file name cannot be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::StreamId;

    #[test]
    fn test_valid_default_config() {
        let config = RecorderConfig::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_fps_out_of_range() {
        let mut config = RecorderConfig::default();
        config.fps = 30;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("fps"), "got: {err}");
    }

    #[test]
    fn test_duplicate_stream_ids() {
        let mut config = RecorderConfig::default();
        config.streams.secondary.id = StreamId::new("rgb");
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate stream id"), "got: {err}");
    }

    #[test]
    fn test_empty_stream_id() {
        let mut config = RecorderConfig::default();
        config.streams.primary.id = StreamId::new("");
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_zero_dimensions() {
        let mut config = RecorderConfig::default();
        config.streams.secondary.width = 0;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("dimensions must be > 0"), "got: {err}");
    }

    #[test]
    fn test_margin_exceeds_threshold() {
        let mut config = RecorderConfig::default();
        config.timing.safety_margin = 0.002;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("safety_margin"), "got: {err}");
    }

    #[test]
    fn test_granularity_exceeds_margin() {
        let mut config = RecorderConfig::default();
        config.timing.busy_wait_granularity = 0.0006;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("busy_wait_granularity"), "got: {err}");
    }

    #[test]
    fn test_empty_timestamp_file() {
        let mut config = RecorderConfig::default();
        config.output.timestamp_file = String::new();
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("timestamp file"), "got: {err}");
    }
}
