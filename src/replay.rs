// src/replay.rs - Recorded landmark snapshots fed back through the engine
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::landmarks::{Handedness, LandmarkSnapshot};
use crate::pipeline::{Detection, DetectionSource, TimedDetection};

#[derive(Deserialize, Debug)]
struct ReplayHand {
    handedness: String,
    landmarks: Vec<[f64; 3]>,
}

#[derive(Deserialize, Debug)]
struct ReplayFrame {
    /// Seconds since the start of the recording
    t: f64,
    hand: Option<ReplayHand>,
}

/// Detection source reading one JSON object per line:
///
/// ```text
/// {"t": 0.033, "hand": {"handedness": "Right", "landmarks": [[x, y, z], ...]}}
/// {"t": 0.066, "hand": null}
/// ```
///
/// Frame times are replayed relative to `start`, so cooldown behaviour is
/// reproducible regardless of how fast the file is read.
pub struct ReplaySource<R> {
    reader: R,
    start: Instant,
    line_no: usize,
    last_t: f64,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, start: Instant) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::from_reader(BufReader::new(file), start))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn from_reader(reader: R, start: Instant) -> Self {
        Self {
            reader,
            start,
            line_no: 0,
            last_t: 0.0,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Replay {
            line: self.line_no,
            message: message.into(),
        }
    }

    fn parse_frame(&mut self, line: &str) -> Result<TimedDetection> {
        let frame: ReplayFrame =
            serde_json::from_str(line).map_err(|e| self.error(e.to_string()))?;

        if !frame.t.is_finite() || frame.t < 0.0 {
            return Err(self.error(format!("invalid timestamp {}", frame.t)));
        }
        if frame.t < self.last_t {
            return Err(self.error(format!(
                "timestamp {} goes backwards (previous {})",
                frame.t, self.last_t
            )));
        }
        self.last_t = frame.t;

        let detection = match frame.hand {
            None => Detection::NoHand,
            Some(hand) => {
                let snapshot = LandmarkSnapshot::from_points(
                    &hand.landmarks,
                    Handedness::from_label(&hand.handedness),
                )
                .map_err(|e| self.error(e.to_string()))?;
                Detection::Hand(snapshot)
            }
        };

        let at = Duration::try_from_secs_f64(frame.t)
            .ok()
            .and_then(|offset| self.start.checked_add(offset))
            .ok_or_else(|| self.error(format!("timestamp {} out of range", frame.t)))?;

        Ok(TimedDetection { at, detection })
    }
}

impl<R: BufRead> DetectionSource for ReplaySource<R> {
    fn next_detection(&mut self) -> Result<Option<TimedDetection>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return self.parse_frame(trimmed).map(Some);
        }
    }
}
