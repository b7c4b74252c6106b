// src/mediapipe_bridge.rs - MediaPipe hand landmarker via helper subprocess
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use image::RgbImage;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::DetectorConfig;
use crate::error::{Error, Result};
use crate::landmarks::{Handedness, LandmarkSnapshot, JOINT_COUNT};
use crate::pipeline::Detection;

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    handedness: String,
    #[serde(default)]
    score: f64,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Turn one line of helper output into a detection.
///
/// Only the first hand is used. A helper-side error is logged and treated as
/// an empty frame.
fn parse_detection(line: &str) -> Result<Detection> {
    let parsed: DetectionJson = serde_json::from_str(line.trim())?;

    if let Some(error) = parsed.error {
        warn!("Landmark helper reported: {}", error);
        return Ok(Detection::NoHand);
    }

    let Some(hand) = parsed.hands.into_iter().next() else {
        return Ok(Detection::NoHand);
    };

    if hand.landmarks.len() != JOINT_COUNT {
        return Err(Error::InvalidSnapshot {
            expected: JOINT_COUNT,
            actual: hand.landmarks.len(),
        });
    }

    let points: Vec<[f64; 3]> = hand.landmarks.iter().map(|lm| [lm.x, lm.y, lm.z]).collect();
    let snapshot = LandmarkSnapshot::from_points(&points, Handedness::from_label(&hand.handedness))?;

    debug!(
        "Hand {} (score {:.2}) wrist=({:.3},{:.3})",
        hand.handedness,
        hand.score,
        snapshot.wrist().x,
        snapshot.wrist().y
    );
    Ok(Detection::Hand(snapshot))
}

/// Landmark provider speaking to a Python MediaPipe helper over pipes.
///
/// Per frame the bridge writes a little-endian `width, height, channels`
/// header followed by raw RGB bytes, then reads back one JSON line.
pub struct MediaPipeBridge {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl MediaPipeBridge {
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        if !config.script.exists() {
            return Err(Error::Bridge(format!(
                "landmark helper script not found at {}",
                config.script.display()
            )));
        }

        info!("Starting MediaPipe helper: {} {}", config.python, config.script.display());

        let mut command = Command::new(&config.python);
        command
            .arg(&config.script)
            .arg("--max-num-hands")
            .arg(config.max_num_hands.to_string())
            .arg("--min-detection-confidence")
            .arg(config.min_detection_confidence.to_string())
            .arg("--min-tracking-confidence")
            .arg(config.min_tracking_confidence.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        // Own process group: the terminal's Ctrl-C goes to us, not the helper
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut process = command
            .spawn()
            .map_err(|e| Error::Bridge(format!("failed to start {}: {}", config.python, e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::Bridge("helper stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| Error::Bridge("helper stdout unavailable".into()))?;
        let mut stdout = BufReader::new(stdout);

        let mut ready = String::new();
        stdout.read_line(&mut ready)?;
        if ready.trim() != "READY" {
            let _ = process.kill();
            return Err(Error::Bridge(format!(
                "helper did not signal ready, got {:?}",
                ready.trim()
            )));
        }

        info!("MediaPipe helper ready");
        Ok(Self {
            process,
            stdin,
            stdout,
        })
    }

    /// Find at most one hand in an RGB frame.
    pub fn detect(&mut self, frame: &RgbImage) -> Result<Detection> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Ok(Detection::NoHand);
        }

        self.stdin.write_all(&width.to_le_bytes())?;
        self.stdin.write_all(&height.to_le_bytes())?;
        self.stdin.write_all(&3u32.to_le_bytes())?;
        self.stdin.write_all(frame.as_raw())?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(Error::Bridge("helper closed its output".into()));
        }

        parse_detection(&line)
    }
}

impl Drop for MediaPipeBridge {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_json(handedness: &str, n: usize) -> String {
        let landmarks: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"x":{},"y":0.5,"z":0.0}}"#, i as f64 / 100.0))
            .collect();
        format!(
            r#"{{"hands":[{{"handedness":"{}","score":0.97,"landmarks":[{}]}}],"error":null}}"#,
            handedness,
            landmarks.join(",")
        )
    }

    #[test]
    fn test_parse_single_hand() {
        let detection = parse_detection(&hand_json("Right", 21)).expect("valid line");
        match detection {
            Detection::Hand(snapshot) => {
                assert_eq!(snapshot.handedness(), Handedness::Right);
                assert_eq!(snapshot.joint(20).x, 0.2);
            }
            other => panic!("expected hand, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_no_hands() {
        let detection = parse_detection(r#"{"hands":[]}"#).unwrap();
        assert_eq!(detection, Detection::NoHand);
    }

    #[test]
    fn test_parse_helper_error_is_no_hand() {
        let detection = parse_detection(r#"{"hands":[],"error":"model not loaded"}"#).unwrap();
        assert_eq!(detection, Detection::NoHand);
    }

    #[test]
    fn test_parse_unknown_handedness_falls_back_to_left() {
        match parse_detection(&hand_json("Ambidextrous", 21)).unwrap() {
            Detection::Hand(snapshot) => assert_eq!(snapshot.handedness(), Handedness::Left),
            other => panic!("expected hand, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_wrong_joint_count() {
        let err = parse_detection(&hand_json("Left", 20)).unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshot { actual: 20, .. }), "got {:?}", err);
    }

    #[test]
    fn test_parse_garbage_is_json_error() {
        let err = parse_detection("not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)), "got {:?}", err);
    }

    #[test]
    fn test_missing_script_is_bridge_error() {
        let config = DetectorConfig {
            script: "/nonexistent/hand_landmarks.py".into(),
            ..DetectorConfig::default()
        };
        match MediaPipeBridge::new(&config) {
            Err(Error::Bridge(msg)) => assert!(msg.contains("not found")),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("bridge should not start without its script"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_helper_exiting_mid_run_is_an_error() {
        let mut script = tempfile::NamedTempFile::new().expect("temp script");
        writeln!(script, "echo READY").unwrap();
        let config = DetectorConfig {
            python: "sh".to_string(),
            script: script.path().to_path_buf(),
            ..DetectorConfig::default()
        };

        let mut bridge = MediaPipeBridge::new(&config).expect("helper signals ready");
        let frame = RgbImage::new(2, 2);
        assert!(bridge.detect(&frame).is_err());
    }
}
