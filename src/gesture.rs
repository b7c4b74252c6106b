// src/gesture.rs - Priority-ordered static gesture classification
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fingers::FingerState;
use crate::landmarks::LandmarkSnapshot;

/// Recognized hand poses.
///
/// Declaration order is the classification priority: the first pose whose
/// predicate holds wins, and at most one pose is reported per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gesture {
    /// All five digits extended.
    Palm,
    /// All five digits curled.
    Fist,
    /// Only the thumb extended, tip above the wrist.
    ThumbsUp,
    /// Only the thumb extended, tip below the wrist.
    ThumbsDown,
    /// Only the index finger extended.
    IndexPointing,
    /// Index and middle extended, the rest curled.
    Peace,
    /// Four fingers extended, thumb curled.
    Rock,
}

/// Number of gestures; sizes per-gesture tables.
pub const GESTURE_COUNT: usize = 7;

impl Gesture {
    /// Every gesture in priority order.
    pub const ALL: [Gesture; GESTURE_COUNT] = [
        Gesture::Palm,
        Gesture::Fist,
        Gesture::ThumbsUp,
        Gesture::ThumbsDown,
        Gesture::IndexPointing,
        Gesture::Peace,
        Gesture::Rock,
    ];

    /// Position in [`Gesture::ALL`], usable as a table index.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Palm => "palm",
            Self::Fist => "fist",
            Self::ThumbsUp => "thumbs-up",
            Self::ThumbsDown => "thumbs-down",
            Self::IndexPointing => "index-pointing",
            Self::Peace => "peace",
            Self::Rock => "rock",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_palm(fs: &FingerState) -> bool {
    fs.count() == 5
}

fn is_fist(fs: &FingerState) -> bool {
    fs.count() == 0
}

fn thumb_only(fs: &FingerState) -> bool {
    fs.thumb() && fs.non_thumb_count() == 0
}

// Strict comparisons: a thumb tip level with the wrist is neither up nor down
fn is_thumbs_up(snapshot: &LandmarkSnapshot, fs: &FingerState) -> bool {
    thumb_only(fs) && snapshot.thumb_tip().y < snapshot.wrist().y
}

fn is_thumbs_down(snapshot: &LandmarkSnapshot, fs: &FingerState) -> bool {
    thumb_only(fs) && snapshot.thumb_tip().y > snapshot.wrist().y
}

fn is_index_pointing(fs: &FingerState) -> bool {
    fs.bits() == [0, 1, 0, 0, 0]
}

fn is_peace(fs: &FingerState) -> bool {
    fs.bits() == [0, 1, 1, 0, 0]
}

fn is_rock(fs: &FingerState) -> bool {
    !fs.thumb() && fs.non_thumb_count() == 4
}

/// Decide which single gesture, if any, the hand is making.
pub fn classify(snapshot: &LandmarkSnapshot, fs: &FingerState) -> Option<Gesture> {
    if is_palm(fs) {
        return Some(Gesture::Palm);
    }
    if is_fist(fs) {
        return Some(Gesture::Fist);
    }
    if is_thumbs_up(snapshot, fs) {
        return Some(Gesture::ThumbsUp);
    }
    if is_thumbs_down(snapshot, fs) {
        return Some(Gesture::ThumbsDown);
    }
    if is_index_pointing(fs) {
        return Some(Gesture::IndexPointing);
    }
    if is_peace(fs) {
        return Some(Gesture::Peace);
    }
    if is_rock(fs) {
        return Some(Gesture::Rock);
    }
    None
}
