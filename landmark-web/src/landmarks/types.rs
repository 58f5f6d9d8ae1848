//! Landmark frame data model
//!
//! Observations are validated when they are built, so everything downstream
//! can index a `HandObservation` without bounds checks.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::indices::HAND_LANDMARK_COUNT;
use crate::error::{TrackingError, TrackingResult};

/// A single 3D landmark point (normalized detector coordinates)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,  // 0-1 normalized, left to right
    pub y: f32,  // 0-1 normalized, top to bottom
    pub z: f32,  // Relative depth
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn from_vector(v: &Vector3<f32>) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Index of the first landmark with a NaN or infinite coordinate
fn check_finite(landmarks: &[Landmark]) -> TrackingResult<()> {
    match landmarks.iter().position(|lm| !lm.is_finite()) {
        Some(index) => Err(TrackingError::NonFiniteLandmark { index }),
        None => Ok(()),
    }
}

fn parse_flat(data: &[f32]) -> TrackingResult<Vec<Landmark>> {
    if data.len() % 3 != 0 {
        return Err(TrackingError::MalformedFlat { len: data.len() });
    }
    Ok(data
        .chunks_exact(3)
        .map(|c| Landmark::new(c[0], c[1], c[2]))
        .collect())
}

/// Detector-assigned hand label
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }

    /// Parse the detector's category name ("Left" / "Right", any case)
    pub fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("left") {
            Some(Handedness::Left)
        } else if label.eq_ignore_ascii_case("right") {
            Some(Handedness::Right)
        } else {
            None
        }
    }

    /// Bridge encoding: 0 = Left, 1 = Right
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Handedness::Left),
            1 => Some(Handedness::Right),
            _ => None,
        }
    }
}

/// One detected hand: exactly 21 landmarks plus handedness
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    landmarks: [Landmark; HAND_LANDMARK_COUNT],
    handedness: Handedness,
    /// Detector confidence, carried through but unused by processing
    confidence: Option<f32>,
}

impl HandObservation {
    /// Fails on a count other than 21 or any non-finite coordinate
    pub fn new(landmarks: &[Landmark], handedness: Handedness) -> TrackingResult<Self> {
        check_finite(landmarks)?;
        let landmarks: [Landmark; HAND_LANDMARK_COUNT] =
            landmarks.try_into().map_err(|_| TrackingError::InvalidObservation {
                expected: HAND_LANDMARK_COUNT,
                actual: landmarks.len(),
            })?;

        Ok(Self {
            landmarks,
            handedness,
            confidence: None,
        })
    }

    /// Build from a flat `[x0, y0, z0, x1, ...]` slice of 63 floats
    pub fn from_flat(data: &[f32], handedness: Handedness) -> TrackingResult<Self> {
        Self::new(&parse_flat(data)?, handedness)
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn landmarks(&self) -> &[Landmark; HAND_LANDMARK_COUNT] {
        &self.landmarks
    }

    /// Landmark by anatomical index (see `indices`); panics past 20
    pub fn landmark(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    /// Same handedness and confidence, different (already valid) landmark set
    pub(crate) fn with_landmarks(&self, landmarks: [Landmark; HAND_LANDMARK_COUNT]) -> Self {
        Self {
            landmarks,
            handedness: self.handedness,
            confidence: self.confidence,
        }
    }
}

/// One detected face. Count is checked by each consumer, since blink
/// detection and mesh deformation accept different sizes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceObservation {
    landmarks: Vec<Landmark>,
}

impl FaceObservation {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Build from a flat `[x0, y0, z0, x1, ...]` slice of finite values
    pub fn from_flat(data: &[f32]) -> TrackingResult<Self> {
        let landmarks = parse_flat(data)?;
        check_finite(&landmarks)?;
        Ok(Self::new(landmarks))
    }

    /// `NonFiniteLandmark` if any coordinate is NaN or infinite
    pub fn check_finite(&self) -> TrackingResult<()> {
        check_finite(&self.landmarks)
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

/// Detector output for one image
#[derive(Clone, Debug, PartialEq)]
pub enum FrameContent {
    Hands(Vec<HandObservation>),
    Face(Option<FaceObservation>),
}

/// One detection result with its ordering timestamp (microseconds)
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub timestamp: u64,
    pub content: FrameContent,
}

impl Frame {
    pub fn hands(timestamp: u64, hands: Vec<HandObservation>) -> Self {
        Self { timestamp, content: FrameContent::Hands(hands) }
    }

    pub fn face(timestamp: u64, face: Option<FaceObservation>) -> Self {
        Self { timestamp, content: FrameContent::Face(face) }
    }
}
