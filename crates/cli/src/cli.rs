//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Duo Recorder - synchronized dual-stream frame acquisition
#[derive(Parser, Debug)]
#[command(
    name = "duo-recorder",
    author,
    version,
    about = "Dual-stream synchronized frame recorder",
    long_about = "Acquires synchronized frames from two independent sensor streams at a\n\
                  fixed target rate, persists them without perturbing timing, and reports\n\
                  acquisition and sync quality."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "DUO_RECORDER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "DUO_RECORDER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a recording session
    Run(RunArgs),

    /// Validate configuration file without recording
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "recorder.toml",
        env = "DUO_RECORDER_CONFIG"
    )]
    pub config: PathBuf,

    /// Override target frame rate from configuration
    #[arg(long, env = "DUO_RECORDER_FPS")]
    pub fps: Option<u32>,

    /// Override records root directory from configuration
    #[arg(short, long, env = "DUO_RECORDER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Recording duration in seconds (0 = until interrupted)
    #[arg(long, default_value = "0", env = "DUO_RECORDER_DURATION")]
    pub duration: u64,

    /// Maximum number of frames to save (0 = unlimited)
    #[arg(long, default_value = "0", env = "DUO_RECORDER_MAX_FRAMES")]
    pub max_frames: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "DUO_RECORDER_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without recording
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "recorder.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "recorder.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show timing tuning details
    #[arg(long)]
    pub timing: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
