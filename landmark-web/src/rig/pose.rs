//! Landmark to bone target mapping
//!
//! Pure: the same hand, scale and convention always give the same pose.
//! Callers that smooth must do it once, before or after `map`.

use nalgebra::Vector3;

use crate::geometry::{midpoint, CoordinateConvention, SceneSpace};
use crate::landmarks::*;

/// Where a bone's target position comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoneSource {
    Landmark(usize),
    /// Virtual bone halfway between two landmarks
    Midpoint(usize, usize),
}

/// Named bone slots of a generic hand rig
///
/// Finger slot 0 of the four long fingers is a virtual metacarpal between
/// the wrist and the knuckle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoneSlot {
    Wrist,
    Thumb0, Thumb1, Thumb2, Thumb3,
    Index0, Index1, Index2, Index3, Index4,
    Middle0, Middle1, Middle2, Middle3, Middle4,
    Ring0, Ring1, Ring2, Ring3, Ring4,
    Pinky0, Pinky1, Pinky2, Pinky3, Pinky4,
}

pub const BONE_COUNT: usize = 25;

impl BoneSlot {
    pub const ALL: [BoneSlot; BONE_COUNT] = [
        BoneSlot::Wrist,
        BoneSlot::Thumb0, BoneSlot::Thumb1, BoneSlot::Thumb2, BoneSlot::Thumb3,
        BoneSlot::Index0, BoneSlot::Index1, BoneSlot::Index2, BoneSlot::Index3, BoneSlot::Index4,
        BoneSlot::Middle0, BoneSlot::Middle1, BoneSlot::Middle2, BoneSlot::Middle3, BoneSlot::Middle4,
        BoneSlot::Ring0, BoneSlot::Ring1, BoneSlot::Ring2, BoneSlot::Ring3, BoneSlot::Ring4,
        BoneSlot::Pinky0, BoneSlot::Pinky1, BoneSlot::Pinky2, BoneSlot::Pinky3, BoneSlot::Pinky4,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoneSlot::Wrist => "wrist",
            BoneSlot::Thumb0 => "thumb0",
            BoneSlot::Thumb1 => "thumb1",
            BoneSlot::Thumb2 => "thumb2",
            BoneSlot::Thumb3 => "thumb3",
            BoneSlot::Index0 => "index0",
            BoneSlot::Index1 => "index1",
            BoneSlot::Index2 => "index2",
            BoneSlot::Index3 => "index3",
            BoneSlot::Index4 => "index4",
            BoneSlot::Middle0 => "middle0",
            BoneSlot::Middle1 => "middle1",
            BoneSlot::Middle2 => "middle2",
            BoneSlot::Middle3 => "middle3",
            BoneSlot::Middle4 => "middle4",
            BoneSlot::Ring0 => "ring0",
            BoneSlot::Ring1 => "ring1",
            BoneSlot::Ring2 => "ring2",
            BoneSlot::Ring3 => "ring3",
            BoneSlot::Ring4 => "ring4",
            BoneSlot::Pinky0 => "pinky0",
            BoneSlot::Pinky1 => "pinky1",
            BoneSlot::Pinky2 => "pinky2",
            BoneSlot::Pinky3 => "pinky3",
            BoneSlot::Pinky4 => "pinky4",
        }
    }

    pub fn source(&self) -> BoneSource {
        use BoneSource::{Landmark as L, Midpoint as M};
        match self {
            BoneSlot::Wrist => L(WRIST),
            BoneSlot::Thumb0 => L(THUMB_CMC),
            BoneSlot::Thumb1 => L(THUMB_MCP),
            BoneSlot::Thumb2 => L(THUMB_IP),
            BoneSlot::Thumb3 => L(THUMB_TIP),
            BoneSlot::Index0 => M(WRIST, INDEX_MCP),
            BoneSlot::Index1 => L(INDEX_MCP),
            BoneSlot::Index2 => L(INDEX_PIP),
            BoneSlot::Index3 => L(INDEX_DIP),
            BoneSlot::Index4 => L(INDEX_TIP),
            BoneSlot::Middle0 => M(WRIST, MIDDLE_MCP),
            BoneSlot::Middle1 => L(MIDDLE_MCP),
            BoneSlot::Middle2 => L(MIDDLE_PIP),
            BoneSlot::Middle3 => L(MIDDLE_DIP),
            BoneSlot::Middle4 => L(MIDDLE_TIP),
            BoneSlot::Ring0 => M(WRIST, RING_MCP),
            BoneSlot::Ring1 => L(RING_MCP),
            BoneSlot::Ring2 => L(RING_PIP),
            BoneSlot::Ring3 => L(RING_DIP),
            BoneSlot::Ring4 => L(RING_TIP),
            BoneSlot::Pinky0 => M(WRIST, PINKY_MCP),
            BoneSlot::Pinky1 => L(PINKY_MCP),
            BoneSlot::Pinky2 => L(PINKY_PIP),
            BoneSlot::Pinky3 => L(PINKY_DIP),
            BoneSlot::Pinky4 => L(PINKY_TIP),
        }
    }

    /// Parent in the rig hierarchy (`None` for the wrist root)
    pub fn parent(&self) -> Option<BoneSlot> {
        match self {
            BoneSlot::Wrist => None,
            BoneSlot::Thumb0 | BoneSlot::Index0 | BoneSlot::Middle0 | BoneSlot::Ring0 | BoneSlot::Pinky0 => {
                Some(BoneSlot::Wrist)
            }
            other => Some(BoneSlot::ALL[other.index() - 1]),
        }
    }
}

/// Target scene-space position for every bone slot
#[derive(Clone, Debug, PartialEq)]
pub struct SkeletonPose {
    positions: [Vector3<f32>; BONE_COUNT],
}

impl SkeletonPose {
    pub fn position(&self, slot: BoneSlot) -> Vector3<f32> {
        self.positions[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoneSlot, Vector3<f32>)> + '_ {
        BoneSlot::ALL.into_iter().zip(self.positions.iter().copied())
    }

    /// `[x0, y0, z0, x1, ...]` in `BoneSlot::ALL` order
    pub fn to_flat(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }
}

/// Map one hand onto bone targets
pub fn map_pose(hand: &HandObservation, scale: f32, space: &impl SceneSpace) -> SkeletonPose {
    let points = hand.landmarks().map(|lm| space.to_scene(lm, scale));

    let positions = BoneSlot::ALL.map(|slot| match slot.source() {
        BoneSource::Landmark(i) => points[i],
        BoneSource::Midpoint(a, b) => midpoint(&points[a], &points[b]),
    });

    SkeletonPose { positions }
}

/// `map_pose` with a fixed scale and convention
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseMapper {
    pub scale: f32,
    pub convention: CoordinateConvention,
}

impl PoseMapper {
    pub fn new(scale: f32, convention: CoordinateConvention) -> Self {
        Self { scale, convention }
    }

    pub fn map(&self, hand: &HandObservation) -> SkeletonPose {
        map_pose(hand, self.scale, &self.convention)
    }
}

impl Default for PoseMapper {
    fn default() -> Self {
        Self::new(1.0, CoordinateConvention::default())
    }
}
