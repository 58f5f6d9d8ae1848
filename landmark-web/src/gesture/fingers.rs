//! Per-finger extension classification
//!
//! Fingers compare tip Y against a reference joint (image Y grows downward,
//! so "above" means smaller Y). The thumb compares X and flips with
//! handedness.

use serde::{Deserialize, Serialize};

use crate::landmarks::{
    HandObservation, Handedness, INDEX_MCP, INDEX_PIP, INDEX_TIP, MIDDLE_MCP, MIDDLE_PIP,
    MIDDLE_TIP, PINKY_MCP, PINKY_PIP, PINKY_TIP, RING_MCP, RING_PIP, RING_TIP, THUMB_MCP,
    THUMB_TIP,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Finger::Thumb => "Thumb",
            Finger::Index => "Index",
            Finger::Middle => "Middle",
            Finger::Ring => "Ring",
            Finger::Pinky => "Pinky",
        }
    }

    pub fn tip(&self) -> usize {
        match self {
            Finger::Thumb => THUMB_TIP,
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }

    /// Joint the tip is compared against
    pub fn reference(&self, reference: FingerReference) -> usize {
        match (self, reference) {
            (Finger::Thumb, _) => THUMB_MCP,
            (Finger::Index, FingerReference::Mcp) => INDEX_MCP,
            (Finger::Index, FingerReference::Pip) => INDEX_PIP,
            (Finger::Middle, FingerReference::Mcp) => MIDDLE_MCP,
            (Finger::Middle, FingerReference::Pip) => MIDDLE_PIP,
            (Finger::Ring, FingerReference::Mcp) => RING_MCP,
            (Finger::Ring, FingerReference::Pip) => RING_PIP,
            (Finger::Pinky, FingerReference::Mcp) => PINKY_MCP,
            (Finger::Pinky, FingerReference::Pip) => PINKY_PIP,
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

/// Reference joint for the four long fingers
///
/// `Mcp` (knuckle) only counts a finger as up when the tip clears the
/// knuckle, a stricter test than `Pip`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FingerReference {
    #[default]
    Mcp,
    Pip,
}

/// Extended flag for each of the five fingers, recomputed every frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerState {
    extended: [bool; 5],
}

impl FingerState {
    pub fn is_extended(&self, finger: Finger) -> bool {
        self.extended[finger.slot()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Finger, bool)> + '_ {
        Finger::ALL.into_iter().map(move |f| (f, self.is_extended(f)))
    }

    pub fn extended_fingers(&self) -> impl Iterator<Item = Finger> + '_ {
        self.iter().filter(|(_, up)| *up).map(|(f, _)| f)
    }

    pub fn count(&self) -> usize {
        self.extended.iter().filter(|up| **up).count()
    }

    /// Extended finger names joined by ", " (empty when none are up)
    pub fn summary(&self) -> String {
        self.extended_fingers()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Classify with the default knuckle reference
pub fn classify(hand: &HandObservation) -> FingerState {
    classify_with(hand, FingerReference::default())
}

pub fn classify_with(hand: &HandObservation, reference: FingerReference) -> FingerState {
    let mut state = FingerState::default();

    let tip = hand.landmark(Finger::Thumb.tip());
    let base = hand.landmark(Finger::Thumb.reference(reference));
    state.extended[Finger::Thumb.slot()] = match hand.handedness() {
        Handedness::Left => tip.x < base.x,
        Handedness::Right => tip.x > base.x,
    };

    for finger in &Finger::ALL[1..] {
        let tip = hand.landmark(finger.tip());
        let joint = hand.landmark(finger.reference(reference));
        state.extended[finger.slot()] = tip.y < joint.y;
    }

    state
}
