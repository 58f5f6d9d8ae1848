//! One Euro Filter - adaptive low-pass filter for landmark jitter
//!
//! Smooth when slow (steady hand), responsive when fast (quick gestures).
//! Each axis adapts its own cutoff from its own speed.
//! Applied to whole hands before bone mapping, never on top of other smoothing.

use std::f32::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::landmarks::{HandObservation, Landmark, HAND_LANDMARK_COUNT};

/// Derivative cutoff frequency (Hz)
const D_CUTOFF: f32 = 1.0;

/// Tuning for a One Euro filter
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneEuroParams {
    /// Minimum cutoff frequency (Hz) - lower = smoother at rest
    pub min_cutoff: f32,
    /// Speed coefficient - higher = less lag during fast motion
    pub beta: f32,
}

impl OneEuroParams {
    /// Hand-tracking preset
    pub fn for_hands() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.15,
        }
    }
}

impl Default for OneEuroParams {
    fn default() -> Self {
        Self::for_hands()
    }
}

#[derive(Clone, Copy, Debug)]
struct Sample {
    position: Vector3<f32>,
    velocity: Vector3<f32>,
    time: f64,
}

/// Blend weight of the new value for a step of `dt` seconds at `cutoff` Hz
fn alpha(dt: f32, cutoff: f32) -> f32 {
    let r = 2.0 * PI * cutoff * dt;
    r / (r + 1.0)
}

/// Adaptive low-pass filter over one 3D point
#[derive(Clone, Debug)]
pub struct OneEuroFilter {
    params: OneEuroParams,
    last: Option<Sample>,
}

impl OneEuroFilter {
    pub fn new(params: OneEuroParams) -> Self {
        Self { params, last: None }
    }

    /// Filter one position at time `t` (seconds)
    ///
    /// The first sample passes through; a non-increasing `t` returns the
    /// previous output unchanged.
    pub fn filter(&mut self, t: f64, position: Vector3<f32>) -> Vector3<f32> {
        let Some(last) = self.last else {
            self.last = Some(Sample {
                position,
                velocity: Vector3::zeros(),
                time: t,
            });
            return position;
        };

        let dt = (t - last.time) as f32;
        if dt <= 0.0 {
            return last.position;
        }

        let raw_velocity = (position - last.position) / dt;
        let velocity = last.velocity.lerp(&raw_velocity, alpha(dt, D_CUTOFF));

        let OneEuroParams { min_cutoff, beta } = self.params;
        let smoothed = last.position.zip_zip_map(&position, &velocity, |prev, cur, speed| {
            let a = alpha(dt, min_cutoff + beta * speed.abs());
            prev + (cur - prev) * a
        });

        self.last = Some(Sample {
            position: smoothed,
            velocity,
            time: t,
        });
        smoothed
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Filters all 21 landmarks of one tracked hand
#[derive(Clone, Debug)]
pub struct HandFilter {
    points: Vec<OneEuroFilter>,
}

impl HandFilter {
    pub fn new(params: OneEuroParams) -> Self {
        Self {
            points: vec![OneEuroFilter::new(params); HAND_LANDMARK_COUNT],
        }
    }

    /// Smoothed copy of `hand`; `t` is the frame time in seconds
    pub fn filter(&mut self, t: f64, hand: &HandObservation) -> HandObservation {
        let mut smoothed = *hand.landmarks();
        for (filter, lm) in self.points.iter_mut().zip(smoothed.iter_mut()) {
            *lm = Landmark::from_vector(&filter.filter(t, lm.to_vector()));
        }
        hand.with_landmarks(smoothed)
    }

    pub fn reset(&mut self) {
        self.points.iter_mut().for_each(OneEuroFilter::reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Handedness;

    #[test]
    fn test_first_sample_passthrough() {
        let mut f = OneEuroFilter::new(OneEuroParams::default());
        let p = Vector3::new(0.7, 0.2, -0.1);
        assert_eq!(f.filter(0.0, p), p);
    }

    #[test]
    fn test_jitter_is_damped_per_axis() {
        let mut f = OneEuroFilter::new(OneEuroParams::default());
        f.filter(0.0, Vector3::new(0.5, 0.5, 0.0));
        let out = f.filter(1.0 / 30.0, Vector3::new(0.52, 0.5, 0.0));
        assert!(out.x > 0.5 && out.x < 0.52);
        assert!((out.y - 0.5).abs() < 1e-6);
        assert!(out.z.abs() < 1e-6);
    }

    #[test]
    fn test_non_increasing_time_holds() {
        let mut f = OneEuroFilter::new(OneEuroParams::default());
        f.filter(1.0, Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(f.filter(1.0, Vector3::new(0.9, 0.9, 0.9)), Vector3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_reset_passes_next_sample() {
        let mut f = OneEuroFilter::new(OneEuroParams::default());
        f.filter(0.0, Vector3::zeros());
        f.reset();
        let p = Vector3::new(1.0, 1.0, 1.0);
        assert_eq!(f.filter(0.1, p), p);
    }

    #[test]
    fn test_hand_filter_keeps_handedness() {
        let points = [Landmark::new(0.5, 0.5, 0.0); 21];
        let hand = HandObservation::new(&points, Handedness::Left).unwrap();
        let mut filter = HandFilter::new(OneEuroParams::default());
        let out = filter.filter(0.0, &hand);
        assert_eq!(out, hand);

        let moved = HandObservation::new(&[Landmark::new(0.6, 0.5, 0.0); 21], Handedness::Left).unwrap();
        let out = filter.filter(1.0 / 30.0, &moved);
        assert_eq!(out.handedness(), Handedness::Left);
        assert!(out.landmark(0).x > 0.5 && out.landmark(0).x < 0.6);
    }
}
