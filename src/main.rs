// src/main.rs
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use gesture_control::actions::{make_injector, InputBackend, BINDINGS};
use gesture_control::cli::{Cli, Commands};
use gesture_control::config::AppConfig;
use gesture_control::mediapipe_bridge::MediaPipeBridge;
use gesture_control::pipeline::{run_loop, CameraDetections, RunSummary, StopSignal};
use gesture_control::replay::ReplaySource;
use gesture_control::video::{list_cameras, VideoSource};
use gesture_control::GestureEngine;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    // Initialize logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Run { max_frames, dry_run } => run_camera(&config, max_frames, dry_run),
        Commands::Replay { file, dry_run } => {
            let backend = backend(&config, dry_run);
            let mut source = ReplaySource::open(&file, Instant::now())
                .with_context(|| format!("Failed to open recording {}", file.display()))?;
            let mut engine = GestureEngine::new();
            let mut injector = make_injector(backend);

            let summary = run_loop(&mut source, &mut engine, injector.as_mut(), &StopSignal::new(), None)
                .context("Replay failed")?;
            print_summary(&summary);
            Ok(())
        }
        Commands::Bindings => {
            println!("{:<16} {:<12} {:>8}  {}", "GESTURE", "KEYS", "COOLDOWN", "LABEL");
            for b in BINDINGS.iter() {
                println!(
                    "{:<16} {:<12} {:>7.1}s  {}",
                    b.gesture.as_str(),
                    b.action.to_string(),
                    b.minimum_interval.as_secs_f64(),
                    b.annotation.text
                );
            }
            Ok(())
        }
        Commands::Config { init } => {
            let path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
            if init {
                config.save(&path).with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn backend(config: &AppConfig, dry_run: bool) -> InputBackend {
    if dry_run {
        InputBackend::DryRun
    } else {
        config.input.backend
    }
}

fn run_camera(config: &AppConfig, max_frames: Option<u64>, dry_run: bool) -> Result<()> {
    match list_cameras() {
        Ok(cameras) => {
            info!("Found {} camera(s)", cameras.len());
            for (i, name) in cameras.iter().enumerate() {
                info!("  [{}] {}", i, name);
            }
        }
        Err(e) => info!("Camera query failed: {}", e),
    }

    let video = VideoSource::new_camera(&config.camera).context("Failed to open camera")?;
    let bridge = MediaPipeBridge::new(&config.detector).context("Failed to start landmark helper")?;
    let mut source = CameraDetections::new(video, bridge);

    let stop = StopSignal::new();
    stop.stop_on_ctrl_c().context("Failed to install Ctrl-C handler")?;

    let mut engine = GestureEngine::new();
    let mut injector = make_injector(backend(config, dry_run));

    info!("Watching for gestures, press Ctrl-C to quit");
    let summary = run_loop(&mut source, &mut engine, injector.as_mut(), &stop, max_frames)?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{} frames, {} with a hand, {} dispatched, {} suppressed",
        summary.frames,
        summary.hand_frames,
        summary.total_dispatched(),
        summary.suppressed
    );
    for (gesture, count) in &summary.dispatched {
        println!("  {:<16} {}", gesture.as_str(), count);
    }
}
