//! Landmark data model - detector output normalized into typed frames
//!
//! Re-exports only. All logic in submodules.

mod indices;
mod types;

pub use indices::*;
pub use types::{FaceObservation, Frame, FrameContent, HandObservation, Handedness, Landmark};
