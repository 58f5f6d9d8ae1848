//! Tracking session storage and JS bridge
//!
//! JavaScript runs the detectors and hands over flat Float32Arrays; the
//! session is ticked from the render loop and outputs are read back as flat
//! arrays and strings.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::config::TrackingConfig;
use crate::error::{TrackingError, TrackingResult};
use crate::landmarks::{
    FaceObservation, Frame, HandObservation, Handedness, HAND_CONNECTIONS, HAND_LANDMARK_COUNT,
};
use crate::rig::BoneSlot;
use crate::session::{TextChannel, TickOutput, TrackingObserver, TrackingSession};

const HAND_FLAT_LEN: usize = HAND_LANDMARK_COUNT * 3;

struct BridgeState {
    session: TrackingSession,
    last: TickOutput,
}

impl BridgeState {
    fn new(config: TrackingConfig) -> TrackingResult<Self> {
        Ok(Self {
            session: TrackingSession::with_observer(config, default_observer())?,
            last: TickOutput::default(),
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn default_observer() -> Box<dyn TrackingObserver> {
    Box::new(crate::session::ConsoleObserver)
}

#[cfg(not(target_arch = "wasm32"))]
fn default_observer() -> Box<dyn TrackingObserver> {
    Box::new(crate::session::TracingObserver)
}

// Thread-local storage (WASM is single-threaded)
thread_local! {
    static TRACKING: RefCell<Option<BridgeState>> = RefCell::new(None);
}

/// Run `f` against the session, creating a default one on first use
fn with_state<R>(f: impl FnOnce(&mut BridgeState) -> R) -> Result<R, JsValue> {
    TRACKING.with(|cell| {
        let mut slot = cell.borrow_mut();
        if let Some(state) = slot.as_mut() {
            return Ok(f(state));
        }
        let state = slot.insert(BridgeState::new(TrackingConfig::default())?);
        Ok(f(state))
    })
}

/// Timestamp in microseconds for frames arriving now
fn now_micros() -> u64 {
    (js_sys::Date::now() * 1000.0) as u64
}

/// Parse a flat hand buffer into a frame stamped `timestamp`
fn hand_frame(flat: &[f32], handedness: &[u8], timestamp: u64) -> TrackingResult<Frame> {
    let expected = handedness.len() * HAND_FLAT_LEN;
    if flat.len() != expected {
        return Err(TrackingError::InvalidObservation {
            expected,
            actual: flat.len(),
        });
    }

    let hands = flat
        .chunks_exact(HAND_FLAT_LEN)
        .zip(handedness)
        .map(|(points, code)| {
            let side = Handedness::from_code(*code)
                .ok_or_else(|| TrackingError::Config(format!("unknown handedness code {}", code)))?;
            HandObservation::from_flat(points, side)
        })
        .collect::<TrackingResult<Vec<_>>>()?;

    Ok(Frame::hands(timestamp, hands))
}

/// Parse a flat face buffer into a frame stamped `timestamp`
fn face_frame(flat: &[f32], timestamp: u64) -> TrackingResult<Frame> {
    let face = if flat.is_empty() {
        None
    } else {
        Some(FaceObservation::from_flat(flat)?)
    };
    Ok(Frame::face(timestamp, face))
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Replace the session with one built from a JSON config (`{}` for defaults)
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let config = TrackingConfig::from_json(json)?;
    let state = BridgeState::new(config)?;
    TRACKING.with(|cell| *cell.borrow_mut() = Some(state));
    Ok(())
}

/// Queue one hand frame
///
/// `flat` holds 63 values (21 landmarks x 3) per hand; `handedness` has one
/// code per hand (0 = Left, 1 = Right). Zero hands is a valid frame.
#[wasm_bindgen]
pub fn apply_hand_landmarks(flat: &[f32], handedness: &[u8]) -> Result<(), JsValue> {
    let frame = hand_frame(flat, handedness, now_micros())?;
    with_state(|state| state.session.submit(frame))??;
    Ok(())
}

/// Queue one face frame; an empty array means no face was found
#[wasm_bindgen]
pub fn apply_face_landmarks(flat: &[f32]) -> Result<(), JsValue> {
    let frame = face_frame(flat, now_micros())?;
    with_state(|state| state.session.submit(frame))??;
    Ok(())
}

/// Process queued frames; call once per rendered frame
///
/// Returns true when a blink transition happened on this tick.
#[wasm_bindgen]
pub fn tick(dt: f32) -> Result<bool, JsValue> {
    with_state(|state| {
        state.last = state.session.tick(dt);
        state.last.blink.is_some()
    })
}

/// Drop all tracking state and queued frames
#[wasm_bindgen]
pub fn reset_tracking() -> Result<(), JsValue> {
    with_state(|state| {
        state.session.reset();
        state.last = TickOutput::default();
    })
}

// ============================================================================
// OUTPUT GETTERS
// ============================================================================

/// Displayed text for "status", "finger", "hand" or "blink"
#[wasm_bindgen]
pub fn get_debug_text(channel: &str) -> Result<String, JsValue> {
    let channel = TextChannel::from_name(channel)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown text channel '{}'", channel)))?;
    with_state(|state| state.session.text(channel).to_string())
}

#[wasm_bindgen]
pub fn get_hand_count() -> usize {
    with_state(|state| state.last.hands.len()).unwrap_or(0)
}

/// Bone targets for one hand, `[x, y, z]` per slot in rig order
#[wasm_bindgen]
pub fn get_hand_bones(hand: usize) -> Option<Vec<f32>> {
    with_state(|state| state.last.hands.get(hand).map(|h| h.pose.to_flat()))
        .ok()
        .flatten()
}

/// One flag per finger (thumb to pinky), 1 when extended
#[wasm_bindgen]
pub fn get_finger_states(hand: usize) -> Option<Vec<u8>> {
    with_state(|state| {
        state
            .last
            .hands
            .get(hand)
            .map(|h| h.fingers.iter().map(|(_, up)| up as u8).collect())
    })
    .ok()
    .flatten()
}

/// Handedness code of a hand in the latest frame (0 = Left, 1 = Right)
#[wasm_bindgen]
pub fn get_hand_handedness(hand: usize) -> Option<u8> {
    with_state(|state| {
        state.last.hands.get(hand).map(|h| match h.handedness {
            Handedness::Left => 0,
            Handedness::Right => 1,
        })
    })
    .ok()
    .flatten()
}

#[wasm_bindgen]
pub fn get_hand_status() -> String {
    with_state(|state| state.last.hand_status.message().to_string()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn is_blinking() -> bool {
    with_state(|state| state.last.is_blinking).unwrap_or(false)
}

/// Deformed face mesh, 468 x `[x, y, z]`
#[wasm_bindgen]
pub fn get_mesh_vertices() -> Option<Vec<f32>> {
    with_state(|state| {
        state
            .last
            .mesh_vertices
            .as_ref()
            .map(|vertices| vertices.iter().flat_map(|v| [v.x, v.y, v.z]).collect())
    })
    .ok()
    .flatten()
}

/// `[px, py, pz, qx, qy, qz, qw]` of the followed weapon pose
#[wasm_bindgen]
pub fn get_weapon_pose() -> Option<Vec<f32>> {
    with_state(|state| state.last.weapon.map(|pose| pose.to_flat().to_vec()))
        .ok()
        .flatten()
}

/// Raw landmark projection for debug markers (no smoothing, no count check)
#[wasm_bindgen]
pub fn project_face_landmarks(flat: &[f32]) -> Result<Vec<f32>, JsValue> {
    let face = FaceObservation::from_flat(flat)?;
    let points = with_state(|state| state.session.project_raw(&face))?;
    Ok(points.iter().flat_map(|p| [p.x, p.y, p.z]).collect())
}

/// Landmark index pairs for drawing hand skeletons
#[wasm_bindgen]
pub fn get_hand_connections() -> Vec<u32> {
    HAND_CONNECTIONS
        .iter()
        .flat_map(|&(a, b)| [a as u32, b as u32])
        .collect()
}

/// Bone slot names in the order used by `get_hand_bones`, comma separated
#[wasm_bindgen]
pub fn get_bone_names() -> String {
    BoneSlot::ALL
        .iter()
        .map(|slot| slot.name())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::FrameContent;

    #[test]
    fn test_hand_frame_splits_hands() {
        let mut flat = vec![0.5; 2 * HAND_FLAT_LEN];
        flat[HAND_FLAT_LEN] = 0.25;
        let frame = hand_frame(&flat, &[1, 0], 42).unwrap();

        assert_eq!(frame.timestamp, 42);
        let FrameContent::Hands(hands) = frame.content else {
            panic!("expected a hand frame");
        };
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[0].handedness(), Handedness::Right);
        assert_eq!(hands[1].handedness(), Handedness::Left);
        assert_eq!(hands[1].landmark(0).x, 0.25);
    }

    #[test]
    fn test_hand_frame_without_hands() {
        let frame = hand_frame(&[], &[], 7).unwrap();
        assert_eq!(frame, Frame::hands(7, Vec::new()));
    }

    #[test]
    fn test_hand_frame_length_mismatch() {
        let flat = vec![0.5; HAND_FLAT_LEN];
        assert_eq!(
            hand_frame(&flat, &[0, 1], 0),
            Err(TrackingError::InvalidObservation { expected: 126, actual: 63 })
        );
        // Floats with no handedness codes
        assert!(hand_frame(&flat, &[], 0).is_err());
    }

    #[test]
    fn test_hand_frame_unknown_code() {
        let flat = vec![0.5; HAND_FLAT_LEN];
        let err = hand_frame(&flat, &[7], 0).unwrap_err();
        assert!(matches!(err, TrackingError::Config(msg) if msg.contains('7')));
    }

    #[test]
    fn test_hand_frame_non_finite() {
        let mut flat = vec![0.5; HAND_FLAT_LEN];
        flat[HAND_FLAT_LEN - 1] = f32::NAN;
        assert_eq!(
            hand_frame(&flat, &[0], 0),
            Err(TrackingError::NonFiniteLandmark { index: HAND_LANDMARK_COUNT - 1 })
        );
    }

    #[test]
    fn test_face_frame() {
        assert_eq!(face_frame(&[], 3).unwrap(), Frame::face(3, None));

        let frame = face_frame(&[0.1, 0.2, 0.3], 4).unwrap();
        assert!(matches!(frame.content, FrameContent::Face(Some(ref f)) if f.len() == 1));

        assert_eq!(face_frame(&[0.1; 4], 0), Err(TrackingError::MalformedFlat { len: 4 }));
        assert_eq!(
            face_frame(&[0.1, f32::INFINITY, 0.3], 0),
            Err(TrackingError::NonFiniteLandmark { index: 0 })
        );
    }
}
