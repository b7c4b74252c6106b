// src/engine.rs - Per-frame classification and debounce
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::actions::{binding, default_intervals, Annotation, InputInjector};
use crate::cooldown::CooldownTable;
use crate::fingers::{self, FingerState};
use crate::gesture::{self, Gesture};
use crate::pipeline::Detection;

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// No hand in view; nothing was classified and no cooldown touched.
    NoHand,
    /// A hand was seen but matched no gesture.
    Unclassified { fingers: FingerState },
    /// A gesture was recognized but its cooldown had not elapsed.
    Suppressed { gesture: Gesture, fingers: FingerState },
    /// A gesture fired: its action was sent and its cooldown re-armed.
    ///
    /// The engine only logs `annotation`; drawing it on a preview is up to
    /// the caller.
    Dispatched {
        gesture: Gesture,
        fingers: FingerState,
        annotation: Annotation,
    },
}

impl FrameOutcome {
    pub fn gesture(&self) -> Option<Gesture> {
        match self {
            FrameOutcome::Suppressed { gesture, .. } | FrameOutcome::Dispatched { gesture, .. } => {
                Some(*gesture)
            }
            _ => None,
        }
    }

    pub fn dispatched(&self) -> Option<Gesture> {
        match self {
            FrameOutcome::Dispatched { gesture, .. } => Some(*gesture),
            _ => None,
        }
    }
}

/// Classification and debounce state for one tracked hand.
///
/// Owns the cooldown table; the injector is borrowed per frame so the engine
/// can be driven without a camera, a display or a real keyboard.
pub struct GestureEngine {
    cooldowns: CooldownTable,
}

impl GestureEngine {
    /// Engine with the fixed intervals from the binding table, all armed.
    pub fn new() -> Self {
        Self::with_cooldowns(CooldownTable::new(default_intervals()))
    }

    pub fn with_cooldowns(cooldowns: CooldownTable) -> Self {
        Self { cooldowns }
    }

    pub fn cooldowns(&self) -> &CooldownTable {
        &self.cooldowns
    }

    /// Run one frame through extract → classify → debounce → dispatch.
    pub fn process_frame(
        &mut self,
        detection: &Detection,
        now: Instant,
        injector: &mut dyn InputInjector,
    ) -> FrameOutcome {
        let snapshot = match detection {
            Detection::Hand(snapshot) => snapshot,
            Detection::NoHand => return FrameOutcome::NoHand,
        };

        let fs = fingers::extract(snapshot);
        debug!("Fingers: {}", fs);

        let Some(gesture) = gesture::classify(snapshot, &fs) else {
            return FrameOutcome::Unclassified { fingers: fs };
        };

        if !self.cooldowns.ready(gesture, now) {
            trace!(
                "{} suppressed, {:?} left",
                gesture,
                self.cooldowns[gesture].remaining(now)
            );
            return FrameOutcome::Suppressed {
                gesture,
                fingers: fs,
            };
        }

        let bound = binding(gesture);
        bound.action.send(injector);
        self.cooldowns.trigger(gesture, now);
        info!(
            "{} -> {} ({})",
            gesture, bound.action, bound.annotation.text
        );

        FrameOutcome::Dispatched {
            gesture,
            fingers: fs,
            annotation: bound.annotation,
        }
    }
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Action, Key, RecordingInjector};
    use crate::fingers::test_support::{hand, hand_with_thumb_y};
    use crate::landmarks::Handedness;
    use std::time::Duration;

    fn at(t0: Instant, secs: f64) -> Instant {
        t0 + Duration::from_secs_f64(secs)
    }

    fn palm() -> Detection {
        Detection::Hand(hand([1, 1, 1, 1, 1], Handedness::Right))
    }

    #[test]
    fn test_new_engine_all_armed() {
        let engine = GestureEngine::new();
        let now = Instant::now();
        for (gesture, cd) in engine.cooldowns().iter() {
            assert!(cd.ready(now), "{} should start armed", gesture);
        }
    }

    #[test]
    fn test_palm_dispatches_play_pause() {
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();

        let outcome = engine.process_frame(&palm(), Instant::now(), &mut injector);

        match outcome {
            FrameOutcome::Dispatched { gesture, annotation, fingers } => {
                assert_eq!(gesture, Gesture::Palm);
                assert_eq!(annotation.text, "Play/Pause");
                assert_eq!(fingers.bits(), [1, 1, 1, 1, 1]);
            }
            other => panic!("expected dispatch, got {:?}", other),
        }
        assert_eq!(injector.sent, vec![Action::Press(Key::Space)]);
    }

    #[test]
    fn test_repeat_within_interval_is_suppressed() {
        let t0 = Instant::now();
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();

        assert_eq!(engine.process_frame(&palm(), t0, &mut injector).dispatched(), Some(Gesture::Palm));

        let outcome = engine.process_frame(&palm(), at(t0, 1.0), &mut injector);
        assert_eq!(
            outcome,
            FrameOutcome::Suppressed {
                gesture: Gesture::Palm,
                fingers: FingerState::from_bits([1, 1, 1, 1, 1]),
            }
        );
        assert_eq!(injector.sent.len(), 1, "suppressed frame must not inject");

        let outcome = engine.process_frame(&palm(), at(t0, 2.1), &mut injector);
        assert_eq!(outcome.dispatched(), Some(Gesture::Palm));
        assert_eq!(injector.sent.len(), 2);
    }

    #[test]
    fn test_suppressed_frame_does_not_rearm_cooldown() {
        let t0 = Instant::now();
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();

        engine.process_frame(&palm(), t0, &mut injector);
        engine.process_frame(&palm(), at(t0, 1.9), &mut injector);
        assert_eq!(engine.cooldowns()[Gesture::Palm].last_fired_at(), Some(t0));
    }

    #[test]
    fn test_cooldowns_are_per_gesture() {
        let t0 = Instant::now();
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();

        engine.process_frame(&palm(), t0, &mut injector);
        let fist = Detection::Hand(hand([0, 0, 0, 0, 0], Handedness::Right));
        let outcome = engine.process_frame(&fist, at(t0, 0.1), &mut injector);

        assert_eq!(outcome.dispatched(), Some(Gesture::Fist));
        assert_eq!(
            injector.sent,
            vec![Action::Press(Key::Space), Action::Press(Key::M)]
        );
    }

    #[test]
    fn test_no_hand_touches_nothing() {
        let t0 = Instant::now();
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();

        for i in 0..10 {
            let outcome = engine.process_frame(&Detection::NoHand, at(t0, i as f64 * 0.1), &mut injector);
            assert_eq!(outcome, FrameOutcome::NoHand);
        }
        assert!(injector.sent.is_empty());
        assert!(engine.cooldowns().iter().all(|(_, cd)| cd.last_fired_at().is_none()));
    }

    #[test]
    fn test_unclassified_touches_nothing() {
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();
        // Thumb + index: no gesture
        let detection = Detection::Hand(hand([1, 1, 0, 0, 0], Handedness::Right));

        let outcome = engine.process_frame(&detection, Instant::now(), &mut injector);
        assert_eq!(
            outcome,
            FrameOutcome::Unclassified { fingers: FingerState::from_bits([1, 1, 0, 0, 0]) }
        );
        assert!(injector.sent.is_empty());
        assert!(engine.cooldowns().iter().all(|(_, cd)| cd.last_fired_at().is_none()));
    }

    #[test]
    fn test_thumbs_up_repeats_at_short_interval() {
        let t0 = Instant::now();
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();
        let up = Detection::Hand(hand_with_thumb_y([1, 0, 0, 0, 0], Handedness::Right, 0.3));

        // 30 fps for one second: fires at 0, then once more than 0.2s has passed
        let fired: Vec<f64> = (0..30)
            .map(|i| i as f64 / 30.0)
            .filter(|&t| engine.process_frame(&up, at(t0, t), &mut injector).dispatched().is_some())
            .collect();

        assert_eq!(fired.len(), 5, "fired at {:?}", fired);
        assert!(injector.sent.iter().all(|a| *a == Action::Press(Key::VolumeUp)));
    }

    #[test]
    fn test_rock_sends_hotkey() {
        let mut engine = GestureEngine::new();
        let mut injector = RecordingInjector::new();
        let rock = Detection::Hand(hand([0, 1, 1, 1, 1], Handedness::Left));

        let outcome = engine.process_frame(&rock, Instant::now(), &mut injector);
        assert_eq!(outcome.gesture(), Some(Gesture::Rock));
        assert_eq!(injector.sent, vec![Action::Hotkey(Key::Shift, Key::N)]);
    }
}
