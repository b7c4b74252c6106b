// src/lib.rs
//! Hand-gesture media remote.
//!
//! Each frame, a single hand's 21 landmarks are reduced to a five-bit
//! finger-state vector, classified into at most one [`Gesture`] by a fixed
//! priority chain, and passed through a per-gesture cooldown before the
//! bound key is sent to the operating system.

pub mod actions;
pub mod cli;
pub mod config;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod fingers;
pub mod gesture;
pub mod landmarks;
pub mod mediapipe_bridge;
pub mod pipeline;
pub mod replay;
pub mod video;

pub use actions::{Action, InputInjector, Key};
pub use cooldown::{Cooldown, CooldownTable};
pub use engine::{FrameOutcome, GestureEngine};
pub use error::{Error, Result};
pub use fingers::{extract, FingerState};
pub use gesture::{classify, Gesture};
pub use landmarks::{Handedness, LandmarkSnapshot};
pub use pipeline::{Detection, DetectionSource, RunSummary, StopSignal};
