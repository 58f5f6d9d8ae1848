//! Geometry module - vector primitives and scene-space mapping
//!
//! Re-exports only. All logic in submodules.

mod space;
mod vector;

pub use space::{CoordinateConvention, DepthSign, SceneSpace};
pub use vector::{cross, distance, look_rotation, midpoint, normalize, EPSILON};
