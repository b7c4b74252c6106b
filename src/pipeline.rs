// src/pipeline.rs - Frame loop tying detection sources to the engine
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::actions::InputInjector;
use crate::engine::{FrameOutcome, GestureEngine};
use crate::error::{Error, Result};
use crate::gesture::Gesture;
use crate::landmarks::LandmarkSnapshot;
use crate::mediapipe_bridge::MediaPipeBridge;
use crate::video::VideoSource;

/// What the landmark provider saw in one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Hand(LandmarkSnapshot),
    /// No hand visible; the frame is skipped.
    NoHand,
}

/// A detection stamped with the time its frame was captured.
#[derive(Debug, Clone)]
pub struct TimedDetection {
    pub at: Instant,
    pub detection: Detection,
}

/// Anything that yields one detection per frame.
pub trait DetectionSource {
    /// Next frame's detection, or `None` once the source is exhausted.
    fn next_detection(&mut self) -> Result<Option<TimedDetection>>;
}

/// Consecutive failed reads after which the camera is considered gone.
const MAX_CONSECUTIVE_FAILURES: u32 = 300;

/// Live camera frames pushed through the MediaPipe helper.
pub struct CameraDetections {
    video: VideoSource,
    bridge: MediaPipeBridge,
    failed_reads: u64,
    consecutive_failures: u32,
}

impl CameraDetections {
    pub fn new(video: VideoSource, bridge: MediaPipeBridge) -> Self {
        Self {
            video,
            bridge,
            failed_reads: 0,
            consecutive_failures: 0,
        }
    }
}

impl DetectionSource for CameraDetections {
    fn next_detection(&mut self) -> Result<Option<TimedDetection>> {
        loop {
            let frame = match self.video.read_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    // Dropped frames are skipped, not fatal
                    self.failed_reads += 1;
                    self.consecutive_failures += 1;
                    if self.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                        return Err(Error::Camera(format!(
                            "{} frame reads in a row failed, last: {}",
                            self.consecutive_failures, e
                        )));
                    }
                    if self.failed_reads % 30 == 1 {
                        warn!("Frame read failed ({} so far): {}", self.failed_reads, e);
                    }
                    continue;
                }
            };
            self.consecutive_failures = 0;
            let at = Instant::now();
            let detection = self.bridge.detect(&frame)?;
            return Ok(Some(TimedDetection { at, detection }));
        }
    }
}

/// Cooperative stop flag checked once per frame.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Flip this signal when the process receives Ctrl-C.
    ///
    /// The listener runs on its own thread with a single-threaded tokio
    /// runtime; the frame loop itself stays synchronous.
    pub fn stop_on_ctrl_c(&self) -> std::io::Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .build()?;
        let signal = self.clone();
        std::thread::Builder::new()
            .name("ctrl-c".into())
            .spawn(move || {
                runtime.block_on(async {
                    match tokio::signal::ctrl_c().await {
                        Ok(()) => {
                            info!("Ctrl-C received, stopping after this frame");
                            signal.stop();
                        }
                        Err(e) => warn!("Could not listen for Ctrl-C: {}", e),
                    }
                });
            })?;
        Ok(())
    }
}

/// Counters gathered over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub hand_frames: u64,
    pub classified: u64,
    pub suppressed: u64,
    pub dispatched: BTreeMap<Gesture, u64>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &FrameOutcome) {
        self.frames += 1;
        match outcome {
            FrameOutcome::NoHand => {}
            FrameOutcome::Unclassified { .. } => self.hand_frames += 1,
            FrameOutcome::Suppressed { .. } => {
                self.hand_frames += 1;
                self.classified += 1;
                self.suppressed += 1;
            }
            FrameOutcome::Dispatched { gesture, .. } => {
                self.hand_frames += 1;
                self.classified += 1;
                *self.dispatched.entry(*gesture).or_insert(0) += 1;
            }
        }
    }

    pub fn total_dispatched(&self) -> u64 {
        self.dispatched.values().sum()
    }
}

/// Pull detections until the source runs dry, the stop signal is raised, or
/// `max_frames` frames have been processed.
pub fn run_loop(
    source: &mut dyn DetectionSource,
    engine: &mut GestureEngine,
    injector: &mut dyn InputInjector,
    stop: &StopSignal,
    max_frames: Option<u64>,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    loop {
        if stop.is_stopped() {
            debug!("Stop requested");
            break;
        }
        if max_frames.is_some_and(|max| summary.frames >= max) {
            debug!("Reached frame limit");
            break;
        }

        // Ctrl-C can take the landmark helper down with us; once a stop is
        // pending a failed read ends the run instead of failing it.
        let timed = match source.next_detection() {
            Ok(Some(timed)) => timed,
            Ok(None) => {
                debug!("Detection source exhausted");
                break;
            }
            Err(e) if stop.is_stopped() => {
                debug!("Detection source failed after stop: {}", e);
                break;
            }
            Err(e) => return Err(e),
        };

        let outcome = engine.process_frame(&timed.detection, timed.at, injector);
        summary.record(&outcome);
    }

    info!(
        "Processed {} frames ({} with a hand), dispatched {}, suppressed {}",
        summary.frames,
        summary.hand_frames,
        summary.total_dispatched(),
        summary.suppressed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::RecordingInjector;
    use crate::fingers::test_support::hand;
    use crate::landmarks::Handedness;
    use std::collections::VecDeque;
    use std::time::Duration;

    struct Scripted {
        frames: VecDeque<TimedDetection>,
    }

    impl Scripted {
        fn new(t0: Instant, frames: Vec<(f64, Detection)>) -> Self {
            Self {
                frames: frames
                    .into_iter()
                    .map(|(t, detection)| TimedDetection {
                        at: t0 + Duration::from_secs_f64(t),
                        detection,
                    })
                    .collect(),
            }
        }
    }

    impl DetectionSource for Scripted {
        fn next_detection(&mut self) -> Result<Option<TimedDetection>> {
            Ok(self.frames.pop_front())
        }
    }

    /// Yields one palm, then raises `stop` (if given) and fails like a helper
    /// whose pipe has closed.
    struct FailsAfterOne {
        t0: Instant,
        served: bool,
        stop: Option<StopSignal>,
    }

    impl DetectionSource for FailsAfterOne {
        fn next_detection(&mut self) -> Result<Option<TimedDetection>> {
            if !self.served {
                self.served = true;
                return Ok(Some(TimedDetection {
                    at: self.t0,
                    detection: palm(),
                }));
            }
            if let Some(stop) = &self.stop {
                stop.stop();
            }
            Err(Error::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe)))
        }
    }

    fn palm() -> Detection {
        Detection::Hand(hand([1, 1, 1, 1, 1], Handedness::Right))
    }

    #[test]
    fn test_run_loop_drains_source() {
        let t0 = Instant::now();
        let mut source = Scripted::new(
            t0,
            vec![
                (0.0, palm()),
                (0.5, palm()),
                (1.0, Detection::NoHand),
                (2.5, palm()),
            ],
        );
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();

        let summary = run_loop(&mut source, &mut engine, &mut injector, &StopSignal::new(), None)
            .expect("scripted source never fails");

        assert_eq!(summary.frames, 4);
        assert_eq!(summary.hand_frames, 3);
        assert_eq!(summary.classified, 3);
        assert_eq!(summary.suppressed, 1);
        assert_eq!(summary.dispatched.get(&Gesture::Palm), Some(&2));
        assert_eq!(injector.sent.len(), 2);
    }

    #[test]
    fn test_run_loop_respects_frame_limit() {
        let t0 = Instant::now();
        let frames = (0..10).map(|i| (i as f64, Detection::NoHand)).collect();
        let mut source = Scripted::new(t0, frames);
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();

        let summary = run_loop(&mut source, &mut engine, &mut injector, &StopSignal::new(), Some(3))
            .unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(source.frames.len(), 7);
    }

    #[test]
    fn test_run_loop_stops_before_first_frame() {
        let t0 = Instant::now();
        let mut source = Scripted::new(t0, vec![(0.0, palm())]);
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();
        let stop = StopSignal::new();
        stop.stop();

        let summary = run_loop(&mut source, &mut engine, &mut injector, &stop, None).unwrap();
        assert_eq!(summary, RunSummary::default());
        assert!(injector.sent.is_empty());
    }

    #[test]
    fn test_source_failure_after_stop_ends_run_cleanly() {
        let stop = StopSignal::new();
        let mut source = FailsAfterOne {
            t0: Instant::now(),
            served: false,
            stop: Some(stop.clone()),
        };
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();

        let summary = run_loop(&mut source, &mut engine, &mut injector, &stop, None)
            .expect("failure after stop should end the run");
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.dispatched.get(&Gesture::Palm), Some(&1));
    }

    #[test]
    fn test_source_failure_without_stop_is_an_error() {
        let mut source = FailsAfterOne {
            t0: Instant::now(),
            served: false,
            stop: None,
        };
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();

        let result = run_loop(&mut source, &mut engine, &mut injector, &StopSignal::new(), None);
        assert!(matches!(result, Err(Error::Io(_))), "got {:?}", result);
    }

    #[test]
    fn test_stop_signal_is_shared() {
        let stop = StopSignal::new();
        let other = stop.clone();
        assert!(!other.is_stopped());
        stop.stop();
        assert!(other.is_stopped());
    }
}
