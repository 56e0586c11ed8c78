//! `run` command implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_recording(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    let mut overridden = false;
    if let Some(fps) = args.fps {
        info!(fps, "Overriding target frame rate from CLI");
        config.fps = fps;
        overridden = true;
    }
    if let Some(ref output) = args.output {
        info!(output = %output.display(), "Overriding records root from CLI");
        config.output.records_root = output.clone();
    }
    if overridden {
        config_loader::ConfigLoader::validate(&config)
            .context("Configuration invalid after CLI overrides")?;
    }

    info!(
        fps = config.fps,
        tolerance = config.frame_tolerance,
        primary = %config.streams.primary.id,
        secondary = %config.streams.secondary.id,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let metrics_port = if args.metrics_port == 0 {
        config.metrics_port
    } else {
        Some(args.metrics_port)
    };

    let pipeline_config = PipelineConfig {
        config,
        duration: if args.duration == 0 {
            None
        } else {
            Some(Duration::from_secs(args.duration))
        },
        max_frames: if args.max_frames == 0 {
            None
        } else {
            Some(args.max_frames)
        },
        metrics_port,
    };

    let pipeline = Pipeline::new(pipeline_config);

    // The session loop is synchronous and owns its own runtime, so it runs on
    // a blocking thread. Signals flip the stop flag and the loop winds down
    // on its own.
    let stop = Arc::new(AtomicBool::new(false));
    let signal_flag = Arc::clone(&stop);
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping recording...");
        signal_flag.store(true, Ordering::Release);
    });

    info!("Starting recording session...");

    let run_stats = tokio::task::spawn_blocking(move || pipeline.run_blocking(stop))
        .await
        .context("Recording task panicked")?
        .context("Recording session failed")?;

    info!(
        frames_saved = run_stats.stats.frame_count,
        frames_dropped = run_stats.stats.dropped_frames,
        duration_secs = run_stats.duration.as_secs_f64(),
        fps = format!("{:.2}", run_stats.achieved_fps()),
        "Recording completed"
    );

    run_stats.print_summary();

    info!("Duo Recorder finished");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &contracts::RecorderConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Recording:");
    println!("  Target rate: {} fps", config.fps);
    println!("  Frame tolerance: {}x interval", config.frame_tolerance);
    println!("  Timestamp batch size: {}", config.batch_size);

    println!("\nStreams:");
    for stream in [&config.streams.primary, &config.streams.secondary] {
        println!(
            "  - {} ({:?}, {}x{})",
            stream.id, stream.kind, stream.width, stream.height
        );
    }

    println!("\nOutput:");
    println!("  Records root: {}", config.output.records_root.display());
    println!("  Timestamp file: {}", config.output.timestamp_file);

    println!();
}
