//! Blink detection - smoothed EAR with a time-based cooldown
//!
//! States: Open (initial) and Closed. A transition needs the smoothed EAR on
//! the far side of the threshold AND an expired cooldown; every transition
//! restarts the cooldown. There is no EAR dead-band.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::ear::face_ear;
use crate::error::TrackingResult;
use crate::landmarks::FaceObservation;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Smoothed EAR below this counts as closed
    pub threshold: f32,
    /// Minimum seconds between transitions
    pub cooldown_secs: f32,
    /// Number of raw EAR samples averaged
    pub buffer_size: usize,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            threshold: 0.25,
            cooldown_secs: 0.15,
            buffer_size: 5,
        }
    }
}

/// Edge reported when the eyes change state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlinkTransition {
    /// Open -> Closed
    Closed,
    /// Closed -> Open
    Opened,
}

impl BlinkTransition {
    pub fn message(&self) -> &'static str {
        match self {
            BlinkTransition::Closed => "Eyes Blinked",
            BlinkTransition::Opened => "Eyes Open",
        }
    }
}

/// Per-face blink state, owned by one tracking session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlinkState {
    pub smoothed_ear: f32,
    pub is_blinking: bool,
    pub cooldown_remaining: f32,
    /// Most recent raw EAR samples, oldest first
    pub samples: VecDeque<f32>,
}

/// Blink state machine for one tracked face
pub struct BlinkDetector {
    config: BlinkConfig,
    state: BlinkState,
}

impl BlinkDetector {
    pub fn new(config: BlinkConfig) -> Self {
        let samples = VecDeque::with_capacity(config.buffer_size.max(1));
        Self {
            config,
            state: BlinkState {
                samples,
                ..BlinkState::default()
            },
        }
    }

    pub fn state(&self) -> &BlinkState {
        &self.state
    }

    pub fn is_blinking(&self) -> bool {
        self.state.is_blinking
    }

    /// Push this face's EAR into the smoothing window
    ///
    /// Eyes with coincident corners are skipped; if both are, the window and
    /// smoothed EAR are left untouched. Returns the raw averaged EAR used.
    pub fn observe(&mut self, face: &FaceObservation) -> TrackingResult<Option<f32>> {
        let sample = face_ear(face)?.average();

        if let Some(ear) = sample {
            let capacity = self.config.buffer_size.max(1);
            while self.state.samples.len() >= capacity {
                self.state.samples.pop_front();
            }
            self.state.samples.push_back(ear);
            self.state.smoothed_ear =
                self.state.samples.iter().sum::<f32>() / self.state.samples.len() as f32;
        }

        Ok(sample)
    }

    /// Advance the cooldown by `dt` seconds and evaluate transitions
    ///
    /// Runs once per render tick whether or not a face was seen. Nothing
    /// transitions before the first EAR sample.
    pub fn tick(&mut self, dt: f32) -> Option<BlinkTransition> {
        let state = &mut self.state;
        state.cooldown_remaining = (state.cooldown_remaining - dt.max(0.0)).max(0.0);

        if state.samples.is_empty() || state.cooldown_remaining > 0.0 {
            return None;
        }

        let closed = state.smoothed_ear < self.config.threshold;
        let transition = match (state.is_blinking, closed) {
            (false, true) => BlinkTransition::Closed,
            (true, false) => BlinkTransition::Opened,
            _ => return None,
        };

        state.is_blinking = transition == BlinkTransition::Closed;
        state.cooldown_remaining = self.config.cooldown_secs;
        Some(transition)
    }

    /// `observe` then `tick`; an invalid face changes nothing
    pub fn update(&mut self, face: &FaceObservation, dt: f32) -> TrackingResult<Option<BlinkTransition>> {
        self.observe(face)?;
        Ok(self.tick(dt))
    }

    /// Reset to Open with an empty window (new tracking session)
    pub fn reset(&mut self) {
        self.state = BlinkState::default();
    }
}

impl Default for BlinkDetector {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackingError;
    use crate::face::test_support::face_with_ear;
    use crate::landmarks::{Landmark, LEFT_EYE, RIGHT_EYE};

    fn count_transitions(
        detector: &mut BlinkDetector,
        ear: f32,
        frames: usize,
        dt: f32,
    ) -> Vec<BlinkTransition> {
        let face = face_with_ear(ear);
        (0..frames)
            .filter_map(|_| detector.update(&face, dt).unwrap())
            .collect()
    }

    #[test]
    fn test_close_then_open_once_each() {
        let mut detector = BlinkDetector::default();

        let closed = count_transitions(&mut detector, 0.1, 5, 0.0);
        assert_eq!(closed, vec![BlinkTransition::Closed]);
        assert!(detector.is_blinking());

        let opened = count_transitions(&mut detector, 0.4, 5, 0.15);
        assert_eq!(opened, vec![BlinkTransition::Opened]);
        assert!(!detector.is_blinking());
    }

    #[test]
    fn test_cooldown_blocks_reopen() {
        let mut detector = BlinkDetector::default();
        count_transitions(&mut detector, 0.1, 1, 0.0);

        // Window fully open but cooldown never elapses
        let none = count_transitions(&mut detector, 0.4, 10, 0.0);
        assert!(none.is_empty());
        assert!(detector.is_blinking());

        // Cooldown runs out on a tick without any face
        assert_eq!(detector.tick(0.2), Some(BlinkTransition::Opened));
    }

    #[test]
    fn test_window_is_bounded() {
        let mut detector = BlinkDetector::new(BlinkConfig { buffer_size: 3, ..BlinkConfig::default() });
        for ear in [0.1, 0.2, 0.3, 0.4] {
            detector.observe(&face_with_ear(ear)).unwrap();
        }
        let state = detector.state();
        assert_eq!(state.samples.len(), 3);
        assert!((state.smoothed_ear - 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_no_transition_before_first_sample() {
        let mut detector = BlinkDetector::default();
        assert_eq!(detector.tick(1.0), None);
        assert!(!detector.is_blinking());
    }

    #[test]
    fn test_degenerate_face_holds_smoothed_ear() {
        let mut detector = BlinkDetector::default();
        detector.observe(&face_with_ear(0.3)).unwrap();

        let mut points = face_with_ear(0.1).landmarks().to_vec();
        for i in LEFT_EYE.into_iter().chain(RIGHT_EYE) {
            points[i] = Landmark::new(0.5, 0.5, 0.0);
        }
        let sample = detector.observe(&FaceObservation::new(points)).unwrap();
        assert_eq!(sample, None);
        assert_eq!(detector.state().samples.len(), 1);
        assert!((detector.state().smoothed_ear - 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_face_leaves_state() {
        let mut detector = BlinkDetector::default();
        let face = FaceObservation::new(vec![Landmark::default(); 10]);
        assert!(detector.update(&face, 1.0).is_err());
        assert!(detector.state().samples.is_empty());
    }

    #[test]
    fn test_nan_eye_not_sampled() {
        let mut detector = BlinkDetector::default();
        detector.observe(&face_with_ear(0.3)).unwrap();

        let mut points = face_with_ear(0.1).landmarks().to_vec();
        points[LEFT_EYE[1]].y = f32::NAN;
        let err = detector.observe(&FaceObservation::new(points)).unwrap_err();
        assert_eq!(err, TrackingError::NonFiniteLandmark { index: LEFT_EYE[1] });
        assert_eq!(detector.state().samples.len(), 1);
        assert!((detector.state().smoothed_ear - 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_messages() {
        assert_eq!(BlinkTransition::Closed.message(), "Eyes Blinked");
        assert_eq!(BlinkTransition::Opened.message(), "Eyes Open");
    }
}
