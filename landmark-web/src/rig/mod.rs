//! Rig module - bone targets and held-object pose
//!
//! Re-exports only. All logic in submodules.

mod pose;
mod weapon;

pub use pose::{map_pose, BoneSlot, BoneSource, PoseMapper, SkeletonPose, BONE_COUNT};
pub use weapon::{solve, solve_hand, WeaponConfig, WeaponPose, WeaponSolution};
