//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    fps: u32,
    frame_tolerance: f64,
    primary_stream: String,
    secondary_stream: String,
    records_root: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    fps: config.fps,
                    frame_tolerance: config.frame_tolerance,
                    primary_stream: config.streams.primary.id.to_string(),
                    secondary_stream: config.streams.secondary.id.to_string(),
                    records_root: config.output.records_root.display().to_string(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &contracts::RecorderConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.frame_tolerance > 2.0 {
        warnings.push(format!(
            "frame_tolerance is {} - deadlines more than two intervals late still count as captured",
            config.frame_tolerance
        ));
    }

    if config.capture_timeout_secs > 30 {
        warnings.push(format!(
            "capture_timeout_secs is {} - a stuck source will stall the loop for a long time",
            config.capture_timeout_secs
        ));
    }

    if config.save_queue_capacity < config.fps as usize {
        warnings.push(format!(
            "save_queue_capacity ({}) is below one second of frames at {} fps - saves may drop under bursts",
            config.save_queue_capacity, config.fps
        ));
    }

    if config.batch_size > 10 * config.fps as usize {
        warnings.push(format!(
            "batch_size ({}) holds more than 10 seconds of timestamps in memory at {} fps",
            config.batch_size, config.fps
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Target rate: {} fps", summary.fps);
            println!("  Frame tolerance: {}x interval", summary.frame_tolerance);
            println!("  Primary stream: {}", summary.primary_stream);
            println!("  Secondary stream: {}", summary.secondary_stream);
            println!("  Records root: {}", summary.records_root);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
