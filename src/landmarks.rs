// src/landmarks.rs - Per-frame hand landmark snapshot
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Number of joints in a hand snapshot.
pub const JOINT_COUNT: usize = 21;

/// MediaPipe hand landmark indices.
pub mod joints {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// Which physical hand produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Map a detector label onto a hand.
    ///
    /// Only the exact label `"Right"` selects the right hand. Every other
    /// label, including empty or unexpected ones, takes the left-hand branch.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Right" => Self::Right,
            "Left" => Self::Left,
            other => {
                debug!("Unrecognized handedness label {:?}, treating as Left", other);
                Self::Left
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

/// One frame's worth of hand landmarks.
///
/// x and y are normalized image coordinates in [0, 1] (y grows downward),
/// z is depth relative to the wrist. Built fresh every frame and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSnapshot {
    joints: [Vector3<f64>; JOINT_COUNT],
    handedness: Handedness,
}

impl LandmarkSnapshot {
    /// Build a snapshot, rejecting anything that is not exactly 21 joints.
    pub fn new(points: &[Vector3<f64>], handedness: Handedness) -> Result<Self> {
        if points.len() != JOINT_COUNT {
            return Err(Error::InvalidSnapshot {
                expected: JOINT_COUNT,
                actual: points.len(),
            });
        }

        let mut joints = [Vector3::zeros(); JOINT_COUNT];
        joints.copy_from_slice(points);

        Ok(Self { joints, handedness })
    }

    /// Build a snapshot from raw `[x, y, z]` triples.
    pub fn from_points(points: &[[f64; 3]], handedness: Handedness) -> Result<Self> {
        let joints: Vec<Vector3<f64>> = points
            .iter()
            .map(|p| Vector3::new(p[0], p[1], p[2]))
            .collect();
        Self::new(&joints, handedness)
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn joint(&self, index: usize) -> &Vector3<f64> {
        &self.joints[index]
    }

    pub fn joints(&self) -> &[Vector3<f64>; JOINT_COUNT] {
        &self.joints
    }

    pub fn wrist(&self) -> &Vector3<f64> {
        &self.joints[joints::WRIST]
    }

    pub fn thumb_tip(&self) -> &Vector3<f64> {
        &self.joints[joints::THUMB_TIP]
    }
}
