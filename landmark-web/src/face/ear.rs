//! Eye Aspect Ratio from the six canonical eye landmarks
//!
//! EAR = (|p1-p5| + |p2-p4|) / (2 |p0-p3|), roughly 0.3 open and near 0 closed.

use nalgebra::Vector3;

use crate::error::{TrackingError, TrackingResult};
use crate::geometry::{distance, EPSILON};
use crate::landmarks::{FaceObservation, FACE_MESH_VERTEX_COUNT, LEFT_EYE, RIGHT_EYE};

/// EAR for one eye, `None` when the corners coincide
pub fn eye_aspect_ratio(eye: &[Vector3<f32>; 6]) -> Option<f32> {
    let horizontal = distance(&eye[0], &eye[3]);
    if horizontal < EPSILON {
        return None;
    }
    let vertical1 = distance(&eye[1], &eye[5]);
    let vertical2 = distance(&eye[2], &eye[4]);
    Some((vertical1 + vertical2) / (2.0 * horizontal))
}

/// Per-eye EAR for one face
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EarSample {
    pub left: Option<f32>,
    pub right: Option<f32>,
}

impl EarSample {
    /// Mean of the eyes that produced a value
    pub fn average(&self) -> Option<f32> {
        match (self.left, self.right) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (Some(v), None) | (None, Some(v)) => Some(v),
            (None, None) => None,
        }
    }
}

/// Both eyes' EAR; the face must carry at least the 468 mesh landmarks, all finite
pub fn face_ear(face: &FaceObservation) -> TrackingResult<EarSample> {
    if face.len() < FACE_MESH_VERTEX_COUNT {
        return Err(TrackingError::InvalidObservation {
            expected: FACE_MESH_VERTEX_COUNT,
            actual: face.len(),
        });
    }
    face.check_finite()?;
    let points = face.landmarks();
    let eye = |indices: &[usize; 6]| indices.map(|i| points[i].to_vector());

    Ok(EarSample {
        left: eye_aspect_ratio(&eye(&LEFT_EYE)),
        right: eye_aspect_ratio(&eye(&RIGHT_EYE)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::test_support::face_with_ear;
    use crate::landmarks::Landmark;

    #[test]
    fn test_known_ratio() {
        let eye = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.3, 0.1, 0.0),
            Vector3::new(0.7, 0.1, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.7, -0.1, 0.0),
            Vector3::new(0.3, -0.1, 0.0),
        ];
        let ear = eye_aspect_ratio(&eye).unwrap();
        assert!((ear - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_corners() {
        let eye = [Vector3::new(0.5, 0.5, 0.0); 6];
        assert_eq!(eye_aspect_ratio(&eye), None);
    }

    #[test]
    fn test_face_ear_average() {
        let sample = face_ear(&face_with_ear(0.3)).unwrap();
        assert!((sample.average().unwrap() - 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_face_ear_one_eye_degenerate() {
        let mut points = face_with_ear(0.2).landmarks().to_vec();
        for i in RIGHT_EYE {
            points[i] = Landmark::new(0.5, 0.5, 0.0);
        }
        let sample = face_ear(&FaceObservation::new(points)).unwrap();
        assert_eq!(sample.right, None);
        assert!((sample.average().unwrap() - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_short_face_rejected() {
        let face = FaceObservation::new(vec![Landmark::default(); 100]);
        assert!(matches!(
            face_ear(&face),
            Err(TrackingError::InvalidObservation { expected: 468, actual: 100 })
        ));
    }
}
