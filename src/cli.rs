// src/cli.rs
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Control media playback with hand gestures seen by a webcam
#[derive(Parser, Debug)]
#[command(name = "gesture_control")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (prints the finger vector every frame)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the camera and send keys for recognized gestures
    Run {
        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<u64>,

        /// Log keys instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Feed a JSON-lines landmark recording through the gesture engine
    Replay {
        /// Recording file
        file: PathBuf,

        /// Log keys instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the gesture → key → cooldown table
    Bindings,

    /// Print the effective configuration
    Config {
        /// Write the defaults to the config path
        #[arg(long)]
        init: bool,
    },
}
