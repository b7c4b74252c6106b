// src/fingers.rs - Reduce a landmark snapshot to an up/down bit per digit
use std::fmt;

use crate::landmarks::{Handedness, LandmarkSnapshot};

/// The five digits, in finger-state order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Landmark index of the fingertip.
    pub fn tip(&self) -> usize {
        match self {
            Self::Thumb => 4,
            Self::Index => 8,
            Self::Middle => 12,
            Self::Ring => 16,
            Self::Pinky => 20,
        }
    }

    /// Landmark the tip is compared against: one joint down for the thumb,
    /// two (the PIP knuckle) for the other fingers.
    pub fn lower_joint(&self) -> usize {
        match self {
            Self::Thumb => self.tip() - 1,
            _ => self.tip() - 2,
        }
    }
}

/// Extended (true) / curled (false) for [thumb, index, middle, ring, pinky].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FingerState([bool; 5]);

impl FingerState {
    pub const fn new(extended: [bool; 5]) -> Self {
        Self(extended)
    }

    /// Build from 0/1 bits; any non-zero bit counts as extended.
    pub fn from_bits(bits: [u8; 5]) -> Self {
        Self(bits.map(|b| b != 0))
    }

    pub fn bits(&self) -> [u8; 5] {
        self.0.map(u8::from)
    }

    pub fn as_array(&self) -> &[bool; 5] {
        &self.0
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }

    pub fn thumb(&self) -> bool {
        self.0[0]
    }

    /// Number of extended digits among index, middle, ring and pinky.
    pub fn non_thumb_count(&self) -> usize {
        self.0[1..].iter().filter(|&&up| up).count()
    }

    /// Number of extended digits overall.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&up| up).count()
    }
}

impl fmt::Display for FingerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e] = self.bits();
        write!(f, "[{}, {}, {}, {}, {}]", a, b, c, d, e)
    }
}

/// Work out which digits are extended.
///
/// Thumb: compared horizontally against its IP joint, the direction flipping
/// with handedness. Other fingers: extended when the tip sits higher in the
/// image (smaller y) than the PIP knuckle. Assumes a roughly upright hand
/// facing the camera; no rotation correction.
pub fn extract(snapshot: &LandmarkSnapshot) -> FingerState {
    let mut extended = [false; 5];

    for (slot, finger) in extended.iter_mut().zip(Finger::ALL) {
        let tip = snapshot.joint(finger.tip());
        let lower = snapshot.joint(finger.lower_joint());

        *slot = match finger {
            Finger::Thumb => match snapshot.handedness() {
                Handedness::Right => tip.x < lower.x,
                Handedness::Left => tip.x > lower.x,
            },
            _ => tip.y < lower.y,
        };
    }

    FingerState(extended)
}
