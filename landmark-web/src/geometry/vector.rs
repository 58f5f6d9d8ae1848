//! Vector primitives on `nalgebra::Vector3`
//!
//! Normalization and basis construction guard against near-zero vectors so
//! a degenerate hand pose never produces NaN transforms.

use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::error::{TrackingError, TrackingResult};

/// Length below which a vector is treated as degenerate
pub const EPSILON: f32 = 1e-8;

/// Sine of the angle below which forward and up count as parallel
const PARALLEL_EPSILON: f32 = 1e-4;

pub fn distance(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    (a - b).norm()
}

pub fn midpoint(a: &Vector3<f32>, b: &Vector3<f32>) -> Vector3<f32> {
    (a + b) * 0.5
}

pub fn cross(a: &Vector3<f32>, b: &Vector3<f32>) -> Vector3<f32> {
    a.cross(b)
}

/// Unit vector in the direction of `v`, or `DegenerateGeometry` when `|v| < EPSILON`
pub fn normalize(v: &Vector3<f32>) -> TrackingResult<Vector3<f32>> {
    let len = v.norm();
    if !len.is_finite() || len < EPSILON {
        return Err(TrackingError::DegenerateGeometry);
    }
    Ok(v / len)
}

/// Orthonormal basis whose +Z is `forward` and whose +Y leans toward `up`
///
/// When `up` is parallel to `forward` (or zero), an arbitrary perpendicular
/// up is chosen instead of failing. A zero `forward` falls back to +Z.
pub fn look_rotation(forward: &Vector3<f32>, up: &Vector3<f32>) -> Rotation3<f32> {
    let z = normalize(forward).unwrap_or_else(|_| Vector3::z());

    let side = normalize(up).map(|u| u.cross(&z)).unwrap_or_else(|_| Vector3::zeros());
    let x = if side.norm() < PARALLEL_EPSILON {
        perpendicular(&z)
    } else {
        // Re-orthogonalize against z
        let x = side - z * side.dot(&z);
        x.normalize()
    };
    let y = z.cross(&x);

    Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, y, z]))
}

/// Any unit vector perpendicular to unit vector `v`
fn perpendicular(v: &Vector3<f32>) -> Vector3<f32> {
    // Cross with the world axis least aligned with v
    let axis = if v.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    axis.cross(v).normalize()
}
