//! Detector space to scene space conversion
//!
//! Detector Y grows downward while scene Y grows upward, so Y is always
//! inverted. The depth sign depends on the detector build and is configured.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::landmarks::Landmark;

/// Sign applied to detector depth
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthSign {
    #[default]
    Preserve,
    Invert,
}

impl DepthSign {
    pub fn factor(self) -> f32 {
        match self {
            DepthSign::Preserve => 1.0,
            DepthSign::Invert => -1.0,
        }
    }
}

/// Maps a normalized landmark into the consuming scene's coordinates
pub trait SceneSpace {
    fn to_scene(&self, landmark: Landmark, scale: f32) -> Vector3<f32>;
}

/// Canonical mapping: `(x*s, (1-y)*s, sign*z*s*depth_scale)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinateConvention {
    pub depth: DepthSign,
    /// Depth scale relative to the XY scale
    pub depth_scale: f32,
}

impl Default for CoordinateConvention {
    fn default() -> Self {
        Self {
            depth: DepthSign::Preserve,
            depth_scale: 1.0,
        }
    }
}

impl SceneSpace for CoordinateConvention {
    fn to_scene(&self, landmark: Landmark, scale: f32) -> Vector3<f32> {
        Vector3::new(
            landmark.x * scale,
            (1.0 - landmark.y) * scale,
            self.depth.factor() * landmark.z * scale * self.depth_scale,
        )
    }
}

impl<F> SceneSpace for F
where
    F: Fn(Landmark, f32) -> Vector3<f32>,
{
    fn to_scene(&self, landmark: Landmark, scale: f32) -> Vector3<f32> {
        self(landmark, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_inverts_y() {
        let c = CoordinateConvention::default();
        let p = c.to_scene(Landmark::new(0.25, 0.25, 0.1), 2.0);
        assert!((p - Vector3::new(0.5, 1.5, 0.2)).norm() < 1e-6);
    }

    #[test]
    fn test_depth_flag() {
        let c = CoordinateConvention { depth: DepthSign::Invert, depth_scale: 0.5 };
        let p = c.to_scene(Landmark::new(0.0, 1.0, 0.4), 10.0);
        assert!((p - Vector3::new(0.0, 0.0, -2.0)).norm() < 1e-6);
    }

    #[test]
    fn test_closure_convention() {
        let swap = |lm: Landmark, s: f32| Vector3::new(lm.y * s, lm.x * s, 0.0);
        let p = swap.to_scene(Landmark::new(1.0, 2.0, 3.0), 1.0);
        assert_eq!(p, Vector3::new(2.0, 1.0, 0.0));
    }
}
