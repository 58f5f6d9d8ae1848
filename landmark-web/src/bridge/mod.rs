//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod tracking;

pub use tracking::{
    // Ingestion and control
    configure,
    apply_hand_landmarks,
    apply_face_landmarks,
    tick,
    reset_tracking,
    // Outputs
    get_debug_text,
    get_hand_count,
    get_hand_bones,
    get_finger_states,
    get_hand_handedness,
    get_hand_status,
    is_blinking,
    get_mesh_vertices,
    get_weapon_pose,
    project_face_landmarks,
    get_hand_connections,
    get_bone_names,
};
