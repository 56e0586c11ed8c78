//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    recording: RecordingInfo,
    streams: Vec<StreamInfo>,
    output: OutputInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    timing: Option<TimingInfo>,
}

#[derive(Serialize)]
struct RecordingInfo {
    fps: u32,
    frame_tolerance: f64,
    batch_size: usize,
    capture_workers: usize,
    save_workers: usize,
    capture_timeout_secs: u64,
}

#[derive(Serialize)]
struct StreamInfo {
    id: String,
    kind: String,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct OutputInfo {
    records_root: String,
    timestamp_file: String,
}

#[derive(Serialize)]
struct TimingInfo {
    coarse_sleep_threshold: f64,
    safety_margin: f64,
    busy_wait_granularity: f64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &contracts::RecorderConfig, args: &InfoArgs) -> ConfigInfo {
    let streams = [&config.streams.primary, &config.streams.secondary]
        .into_iter()
        .map(|s| StreamInfo {
            id: s.id.to_string(),
            kind: format!("{:?}", s.kind),
            width: s.width,
            height: s.height,
        })
        .collect();

    let timing = if args.timing {
        Some(TimingInfo {
            coarse_sleep_threshold: config.timing.coarse_sleep_threshold,
            safety_margin: config.timing.safety_margin,
            busy_wait_granularity: config.timing.busy_wait_granularity,
        })
    } else {
        None
    };

    ConfigInfo {
        recording: RecordingInfo {
            fps: config.fps,
            frame_tolerance: config.frame_tolerance,
            batch_size: config.batch_size,
            capture_workers: config.capture_workers,
            save_workers: config.save_workers,
            capture_timeout_secs: config.capture_timeout_secs,
        },
        streams,
        output: OutputInfo {
            records_root: config.output.records_root.display().to_string(),
            timestamp_file: config.output.timestamp_file.clone(),
        },
        timing,
    }
}

fn print_config_info(config: &contracts::RecorderConfig, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Duo Recorder Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🎬 Recording");
    println!("   ├─ Target rate: {} fps", config.fps);
    println!("   ├─ Frame tolerance: {}x interval", config.frame_tolerance);
    println!("   ├─ Timestamp batch size: {}", config.batch_size);
    println!(
        "   ├─ Workers: {} capture, {} save",
        config.capture_workers, config.save_workers
    );
    println!("   └─ Capture timeout: {}s", config.capture_timeout_secs);

    println!("\n📷 Streams");
    let streams = [&config.streams.primary, &config.streams.secondary];
    for (i, stream) in streams.iter().enumerate() {
        let prefix = if i == streams.len() - 1 { "└─" } else { "├─" };
        println!(
            "   {} {} ({:?}, {}x{})",
            prefix, stream.id, stream.kind, stream.width, stream.height
        );
    }

    println!("\n📤 Output");
    println!(
        "   ├─ Records root: {}",
        config.output.records_root.display()
    );
    println!("   └─ Timestamp file: {}", config.output.timestamp_file);

    if args.timing {
        println!("\n⚙️  Timing Tuning");
        println!(
            "   ├─ Coarse sleep threshold: {}s",
            config.timing.coarse_sleep_threshold
        );
        println!("   ├─ Safety margin: {}s", config.timing.safety_margin);
        println!(
            "   └─ Busy-wait granularity: {}s",
            config.timing.busy_wait_granularity
        );
    }

    println!();
}
