//! Face module - blink detection and face mesh deformation
//!
//! Re-exports only. All logic in submodules.

mod blink;
mod ear;
mod mesh;

pub use blink::{BlinkConfig, BlinkDetector, BlinkState, BlinkTransition};
pub use ear::{eye_aspect_ratio, face_ear, EarSample};
pub use mesh::{deform, project, FaceMeshDeformer, MeshConfig, MeshDeformState};
