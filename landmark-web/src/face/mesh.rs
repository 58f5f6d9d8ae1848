//! Face mesh deformation - landmarks drive a 468-vertex canonical mesh
//!
//! Index-for-index mapping, so it is only valid for the canonical topology.
//! Positions are exponentially smoothed in landmark space before projection.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{TrackingError, TrackingResult};
use crate::landmarks::{FaceObservation, Landmark, FACE_LANDMARK_COUNT_WITH_IRIS, FACE_MESH_VERTEX_COUNT};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Weight of the newest frame (0 = frozen, 1 = no smoothing)
    pub smoothing_factor: f32,
    /// Scene units per normalized landmark unit
    pub scale: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.5,
            scale: 100.0,
        }
    }
}

/// Smoothed landmark positions from the previous frame (empty before the first)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshDeformState {
    pub previous_positions: Vec<Vector3<f32>>,
}

/// Centre on 0.5, flip Y up, flip Z toward the viewer, then scale
pub fn project(landmark: &Vector3<f32>, scale: f32) -> Vector3<f32> {
    Vector3::new(
        scale * (landmark.x - 0.5),
        scale * (0.5 - landmark.y),
        -scale * landmark.z,
    )
}

/// Deform one frame, updating `state` in place
///
/// Accepts the 468 mesh landmarks alone or with the 10 iris points (478);
/// only the first 468 are used. The first call seeds `state` with the frame.
/// A rejected frame leaves `state` untouched.
pub fn deform(
    face: &FaceObservation,
    state: &mut MeshDeformState,
    smoothing_factor: f32,
    scale: f32,
) -> TrackingResult<Vec<Vector3<f32>>> {
    let count = face.len();
    if count != FACE_MESH_VERTEX_COUNT && count != FACE_LANDMARK_COUNT_WITH_IRIS {
        return Err(TrackingError::LandmarkCountMismatch {
            expected: FACE_MESH_VERTEX_COUNT,
            actual: count,
        });
    }
    face.check_finite()?;

    let current = face.landmarks()[..FACE_MESH_VERTEX_COUNT]
        .iter()
        .map(|lm| lm.to_vector());

    if state.previous_positions.len() != FACE_MESH_VERTEX_COUNT {
        state.previous_positions = current.collect();
    } else {
        for (prev, cur) in state.previous_positions.iter_mut().zip(current) {
            // prev + (cur - prev) * t leaves prev bit-identical when cur == prev
            *prev += (cur - *prev) * smoothing_factor;
        }
    }

    Ok(state
        .previous_positions
        .iter()
        .map(|p| project(p, scale))
        .collect())
}

/// Deformer bound to one mesh instance
pub struct FaceMeshDeformer {
    config: MeshConfig,
    state: MeshDeformState,
}

impl FaceMeshDeformer {
    /// Fails unless the target mesh has exactly the canonical vertex count
    pub fn new(mesh_vertex_count: usize, config: MeshConfig) -> TrackingResult<Self> {
        if mesh_vertex_count != FACE_MESH_VERTEX_COUNT {
            return Err(TrackingError::LandmarkCountMismatch {
                expected: FACE_MESH_VERTEX_COUNT,
                actual: mesh_vertex_count,
            });
        }
        Ok(Self {
            config,
            state: MeshDeformState::default(),
        })
    }

    pub fn deform(&mut self, face: &FaceObservation) -> TrackingResult<Vec<Vector3<f32>>> {
        deform(face, &mut self.state, self.config.smoothing_factor, self.config.scale)
    }

    /// Unsmoothed projection of every landmark, for debug markers
    pub fn project_raw(&self, face: &FaceObservation) -> Vec<Vector3<f32>> {
        face.landmarks()
            .iter()
            .map(|lm: &Landmark| project(&lm.to_vector(), self.config.scale))
            .collect()
    }

    pub fn state(&self) -> &MeshDeformState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = MeshDeformState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(count: usize, offset: f32) -> FaceObservation {
        FaceObservation::new(
            (0..count)
                .map(|i| Landmark::new(i as f32 / count as f32, 0.5 + offset, 0.01 * offset))
                .collect(),
        )
    }

    #[test]
    fn test_rejects_wrong_counts() {
        let mut state = MeshDeformState::default();
        for count in [467, 469, 0] {
            let err = deform(&face(count, 0.0), &mut state, 0.5, 100.0).unwrap_err();
            assert_eq!(err, TrackingError::LandmarkCountMismatch { expected: 468, actual: count });
        }
        assert!(state.previous_positions.is_empty());
    }

    #[test]
    fn test_non_finite_frame_keeps_state() {
        let mut state = MeshDeformState::default();
        deform(&face(478, 0.1), &mut state, 0.5, 100.0).unwrap();
        let before = state.previous_positions.clone();

        let mut points = face(478, 0.3).landmarks().to_vec();
        points[10].x = f32::NAN;
        let err = deform(&FaceObservation::new(points), &mut state, 0.5, 100.0).unwrap_err();
        assert_eq!(err, TrackingError::NonFiniteLandmark { index: 10 });
        assert_eq!(state.previous_positions, before);

        let out = deform(&face(478, 0.1), &mut state, 0.5, 100.0).unwrap();
        assert!(out.iter().all(|v| v.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn test_rejects_wrong_topology() {
        assert!(FaceMeshDeformer::new(500, MeshConfig::default()).is_err());
        assert!(FaceMeshDeformer::new(468, MeshConfig::default()).is_ok());
    }

    #[test]
    fn test_first_frame_not_smoothed() {
        let mut state = MeshDeformState::default();
        let frame = face(478, 0.2);
        let out = deform(&frame, &mut state, 0.1, 100.0).unwrap();
        assert_eq!(out.len(), 468);
        let expected = project(&frame.landmarks()[10].to_vector(), 100.0);
        assert!((out[10] - expected).norm() < 1e-5);
    }

    #[test]
    fn test_converged_frame_unchanged() {
        let frame = face(468, 0.1);
        for t in [0.0, 0.3, 0.5, 1.0] {
            let mut state = MeshDeformState::default();
            let first = deform(&frame, &mut state, t, 100.0).unwrap();
            let before = state.previous_positions.clone();
            let second = deform(&frame, &mut state, t, 100.0).unwrap();
            assert_eq!(first, second);
            assert_eq!(before, state.previous_positions);
        }
    }

    #[test]
    fn test_smoothing_halfway() {
        let mut deformer = FaceMeshDeformer::new(468, MeshConfig::default()).unwrap();
        deformer.deform(&face(468, 0.0)).unwrap();
        deformer.deform(&face(468, 0.2)).unwrap();
        let y = deformer.state().previous_positions[0].y;
        assert!((y - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_projection_axes() {
        let p = project(&Vector3::new(0.75, 0.25, 0.1), 100.0);
        assert!((p - Vector3::new(25.0, 25.0, -10.0)).norm() < 1e-4);
    }
}
