//! Landmark Web - hand and face landmark tracking for avatar rigs
//!
//! Entry point for the WASM module and the native library. Contains:
//! - Module declarations
//! - Re-exports of the processing API
//! - wasm_bindgen entry points that delegate to `bridge`

pub mod config;
pub mod error;
pub mod face;
pub mod geometry;
pub mod gesture;
pub mod landmarks;
pub mod rig;
pub mod session;
pub mod smoothing;

mod bridge;

use wasm_bindgen::prelude::*;

pub use bridge::{
    apply_face_landmarks, apply_hand_landmarks, configure, get_bone_names, get_debug_text,
    get_finger_states, get_hand_bones, get_hand_connections, get_hand_count, get_hand_handedness,
    get_hand_status, get_mesh_vertices, get_weapon_pose, is_blinking, project_face_landmarks,
    reset_tracking, tick,
};
pub use config::TrackingConfig;
pub use error::{TrackingError, TrackingResult};
pub use session::{TickOutput, TrackingSession};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}
