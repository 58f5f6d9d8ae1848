//! Held-object pose from the palm basis
//!
//! Forward runs from the knuckle centroid back toward the wrist/pinky edge,
//! up is the palm normal. Degenerate palms fall back to a safe basis.

use nalgebra::{Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometry::{cross, look_rotation, midpoint, normalize, SceneSpace};
use crate::landmarks::{HandObservation, INDEX_MCP, MIDDLE_MCP, PINKY_MCP, WRIST};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Added to the grip point, scene units
    pub offset: [f32; 3],
    /// Follow speed for `WeaponPose::follow`, per second
    pub follow_rate: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            offset: [0.0, 0.0, 0.0],
            follow_rate: 10.0,
        }
    }
}

/// Target 6-DOF pose for an attached object
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponPose {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl WeaponPose {
    pub fn rotation_matrix(&self) -> Rotation3<f32> {
        self.orientation.to_rotation_matrix()
    }

    /// Step toward `target`: lerp position, slerp orientation
    ///
    /// `rate` is per second; the blend is frame-rate independent.
    pub fn follow(&self, target: &WeaponPose, rate: f32, dt: f32) -> WeaponPose {
        let t = (1.0 - (-rate.max(0.0) * dt.max(0.0)).exp()).clamp(0.0, 1.0);
        let orientation = self
            .orientation
            .try_slerp(&target.orientation, t, 1e-6)
            .unwrap_or(target.orientation);

        WeaponPose {
            position: self.position + (target.position - self.position) * t,
            orientation,
        }
    }

    /// `[px, py, pz, qx, qy, qz, qw]`
    pub fn to_flat(&self) -> [f32; 7] {
        let q = self.orientation.quaternion();
        [
            self.position.x, self.position.y, self.position.z,
            q.i, q.j, q.k, q.w,
        ]
    }
}

impl Default for WeaponPose {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }
}

/// Solver output; `degenerate` is set when a fallback axis was used
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponSolution {
    pub pose: WeaponPose,
    pub degenerate: bool,
}

/// Pose from wrist (0), pinky base (17), index base (5), middle base (9)
pub fn solve(
    wrist: &Vector3<f32>,
    pinky_base: &Vector3<f32>,
    index_base: &Vector3<f32>,
    middle_base: &Vector3<f32>,
    offset: &Vector3<f32>,
) -> WeaponSolution {
    let knuckle = midpoint(index_base, middle_base);
    let heel = midpoint(wrist, pinky_base);

    let palm_normal = normalize(&cross(&(wrist - pinky_base), &(wrist - knuckle)));
    let centroid = (index_base + middle_base + knuckle) / 3.0;
    let forward = normalize(&(heel - centroid));

    let degenerate = palm_normal.is_err() || forward.is_err();
    let up = palm_normal.unwrap_or_else(|_| Vector3::y());
    let forward = forward.unwrap_or_else(|_| Vector3::z());

    let rotation = look_rotation(&forward, &up);

    WeaponSolution {
        pose: WeaponPose {
            position: heel + offset,
            orientation: UnitQuaternion::from_rotation_matrix(&rotation),
        },
        degenerate,
    }
}

/// Solve from a hand, using its scene-space landmark positions
pub fn solve_hand(
    hand: &HandObservation,
    scale: f32,
    space: &impl SceneSpace,
    offset: &Vector3<f32>,
) -> WeaponSolution {
    let p = |i: usize| space.to_scene(hand.landmark(i), scale);
    solve(&p(WRIST), &p(PINKY_MCP), &p(INDEX_MCP), &p(MIDDLE_MCP), offset)
}
