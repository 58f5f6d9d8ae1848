//! Tracking session - owns per-entity state and runs frames on the tick
//!
//! Frames are queued by detector callbacks and applied in order on `tick`.
//! Each stream (hands, face) must be non-decreasing in timestamp; older
//! frames are dropped and reported rather than corrupting filter state.

use nalgebra::Vector3;

use crate::config::TrackingConfig;
use crate::error::{TrackingError, TrackingResult};
use crate::face::{BlinkDetector, BlinkTransition, FaceMeshDeformer};
use crate::gesture::{
    aggregate, classify_with, count_message, finger_status_message, FingerState, HandAggregate, HandStatus,
};
use crate::landmarks::{FaceObservation, Frame, FrameContent, HandObservation, Handedness, FACE_MESH_VERTEX_COUNT};
use crate::rig::{solve_hand, PoseMapper, SkeletonPose, WeaponPose, WeaponSolution};
use crate::smoothing::HandFilter;

use super::debug_text::{DebugText, TextChannel};
use super::dispatch::{DispatchHandle, DispatchQueue};
use super::observer::{TracingObserver, TrackingEvent, TrackingObserver};

const NO_HANDS_DETECTED: &str = "No hand landmarks detected.";

/// Everything derived from one hand in the latest hand frame
#[derive(Clone, Debug, PartialEq)]
pub struct HandResult {
    pub handedness: Handedness,
    pub fingers: FingerState,
    pub pose: SkeletonPose,
    pub weapon: WeaponSolution,
}

/// Snapshot returned by `TrackingSession::tick`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickOutput {
    pub frames_processed: usize,
    pub frames_rejected: usize,
    /// Latest hand results, held when no hand frame arrived this tick
    pub hands: Vec<HandResult>,
    pub hand_status: HandStatus,
    pub total_extended: usize,
    pub blink: Option<BlinkTransition>,
    pub is_blinking: bool,
    /// Latest deformed mesh, `None` until a valid face frame
    pub mesh_vertices: Option<Vec<Vector3<f32>>>,
    /// Followed weapon pose, `None` until a hand was seen
    pub weapon: Option<WeaponPose>,
    pub status_text: String,
    pub finger_text: String,
    pub hand_text: String,
    pub blink_text: String,
}

#[derive(Clone, Copy, Debug, Default)]
struct StreamClock {
    last: Option<u64>,
}

impl StreamClock {
    /// `Err(last)` when `timestamp` goes backwards
    fn advance(&mut self, timestamp: u64) -> Result<(), u64> {
        match self.last {
            Some(last) if timestamp < last => Err(last),
            _ => {
                self.last = Some(timestamp);
                Ok(())
            }
        }
    }
}

fn hand_slot(handedness: Handedness) -> usize {
    match handedness {
        Handedness::Left => 0,
        Handedness::Right => 1,
    }
}

pub struct TrackingSession {
    config: TrackingConfig,
    queue: DispatchQueue<Frame>,
    observer: Box<dyn TrackingObserver>,
    text: DebugText,

    blink: BlinkDetector,
    mesh: FaceMeshDeformer,
    mapper: PoseMapper,
    filters: [Option<HandFilter>; 2],

    hand_clock: StreamClock,
    face_clock: StreamClock,

    hands: Vec<HandResult>,
    aggregate: HandAggregate,
    mesh_vertices: Option<Vec<Vector3<f32>>>,
    weapon_target: Option<WeaponPose>,
    weapon: Option<WeaponPose>,
}

impl TrackingSession {
    /// Session that reports through `tracing`
    pub fn new(config: TrackingConfig) -> TrackingResult<Self> {
        Self::with_observer(config, Box::new(TracingObserver))
    }

    pub fn with_observer(config: TrackingConfig, observer: Box<dyn TrackingObserver>) -> TrackingResult<Self> {
        config.validate()?;

        let mesh = FaceMeshDeformer::new(FACE_MESH_VERTEX_COUNT, config.mesh.clone())?;
        let mapper = PoseMapper::new(config.pose.scale, config.pose.convention());
        let filters = match config.pose.smoothing {
            Some(params) => [Some(HandFilter::new(params)), Some(HandFilter::new(params))],
            None => [None, None],
        };

        Ok(Self {
            queue: DispatchQueue::new(config.queue_capacity),
            blink: BlinkDetector::new(config.blink.clone()),
            observer,
            text: DebugText::new(),
            mesh,
            mapper,
            filters,
            hand_clock: StreamClock::default(),
            face_clock: StreamClock::default(),
            hands: Vec::new(),
            aggregate: HandAggregate::default(),
            mesh_vertices: None,
            weapon_target: None,
            weapon: None,
            config,
        })
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Producer handle for detector callbacks
    pub fn handle(&self) -> DispatchHandle<Frame> {
        self.queue.handle()
    }

    /// Queue a frame for the next tick
    pub fn submit(&mut self, frame: Frame) -> TrackingResult<()> {
        let result = self.queue.push(frame);
        if let Err(TrackingError::QueueFull { capacity }) = result {
            self.observer.on_event(&TrackingEvent::FrameDropped { capacity });
        }
        result
    }

    pub fn pending_frames(&self) -> usize {
        self.queue.len()
    }

    /// Apply queued frames, advance the blink cooldown once, and advance the
    /// UI text channels
    pub fn tick(&mut self, dt: f32) -> TickOutput {
        let mut processed = 0;
        let mut rejected = 0;

        for frame in self.queue.drain() {
            if self.apply(frame) {
                processed += 1;
            } else {
                rejected += 1;
            }
        }

        let blink = self.blink.tick(dt);
        if let Some(transition) = blink {
            self.text.push(TextChannel::Blink, transition.message());
            self.observer.on_event(&TrackingEvent::Blink(transition));
        }

        self.follow_weapon(dt);
        self.text.advance();

        TickOutput {
            frames_processed: processed,
            frames_rejected: rejected,
            hands: self.hands.clone(),
            hand_status: self.aggregate.combined,
            total_extended: self.aggregate.total_extended,
            blink,
            is_blinking: self.blink.is_blinking(),
            mesh_vertices: self.mesh_vertices.clone(),
            weapon: self.weapon,
            status_text: self.text.text(TextChannel::Status).to_string(),
            finger_text: self.text.text(TextChannel::Finger).to_string(),
            hand_text: self.text.text(TextChannel::Hand).to_string(),
            blink_text: self.text.text(TextChannel::Blink).to_string(),
        }
    }

    /// Returns false when the frame was dropped
    fn apply(&mut self, frame: Frame) -> bool {
        let clock = match frame.content {
            FrameContent::Hands(_) => &mut self.hand_clock,
            FrameContent::Face(_) => &mut self.face_clock,
        };
        if let Err(last) = clock.advance(frame.timestamp) {
            self.observer.on_event(&TrackingEvent::OutOfOrder {
                timestamp: frame.timestamp,
                last,
            });
            return false;
        }

        match frame.content {
            FrameContent::Hands(hands) => {
                self.apply_hands(frame.timestamp, &hands);
                true
            }
            FrameContent::Face(Some(face)) => self.apply_face(frame.timestamp, &face),
            FrameContent::Face(None) => true,
        }
    }

    fn apply_hands(&mut self, timestamp: u64, hands: &[HandObservation]) {
        let mut seen = [false; 2];
        let t_secs = timestamp as f64 * 1e-6;
        let convention = self.config.pose.convention();
        let offset = Vector3::from(self.config.weapon.offset);

        let mut results = Vec::with_capacity(hands.len());
        for (i, hand) in hands.iter().enumerate() {
            let fingers = classify_with(hand, self.config.fingers.reference);
            self.text.push(TextChannel::Status, count_message(i, &fingers));
            self.text.push(TextChannel::Finger, finger_status_message(&fingers));

            // One filter per handedness; a duplicate label in one frame is mapped raw
            let slot = hand_slot(hand.handedness());
            let smoothed = match self.filters[slot].as_mut() {
                Some(filter) if !seen[slot] => filter.filter(t_secs, hand),
                _ => hand.clone(),
            };
            seen[slot] = true;

            let pose = self.mapper.map(&smoothed);
            let weapon = solve_hand(&smoothed, self.config.pose.scale, &convention, &offset);
            if weapon.degenerate {
                self.observer.on_event(&TrackingEvent::DegenerateWeapon {
                    handedness: hand.handedness(),
                });
            }

            results.push(HandResult {
                handedness: hand.handedness(),
                fingers,
                pose,
                weapon,
            });
        }

        // Hands that left the frame start fresh when they return
        for (slot, filter) in self.filters.iter_mut().enumerate() {
            if let Some(filter) = filter {
                if !seen[slot] {
                    filter.reset();
                }
            }
        }

        if hands.is_empty() {
            self.text.push(TextChannel::Status, NO_HANDS_DETECTED);
        }

        let states: Vec<FingerState> = results.iter().map(|r| r.fingers).collect();
        let labels: Vec<Handedness> = results.iter().map(|r| r.handedness).collect();
        self.aggregate = aggregate(&states, &labels);
        self.text.push(TextChannel::Hand, self.aggregate.combined.message());
        self.observer.on_event(&TrackingEvent::Hands {
            count: results.len(),
            total_extended: self.aggregate.total_extended,
            status: self.aggregate.combined,
        });

        self.weapon_target = results.first().map(|r| r.weapon.pose);
        self.hands = results;
    }

    fn apply_face(&mut self, timestamp: u64, face: &FaceObservation) -> bool {
        // Deform validates count and finiteness before anything is mutated
        let vertices = match self.mesh.deform(face) {
            Ok(vertices) => vertices,
            Err(error) => {
                self.observer.on_event(&TrackingEvent::FrameRejected { timestamp, error });
                return false;
            }
        };
        self.mesh_vertices = Some(vertices);

        if let Err(error) = self.blink.observe(face) {
            self.observer.on_event(&TrackingEvent::FrameRejected { timestamp, error });
            return false;
        }
        true
    }

    fn follow_weapon(&mut self, dt: f32) {
        let Some(target) = self.weapon_target else {
            return;
        };
        let rate = self.config.weapon.follow_rate;
        self.weapon = Some(match self.weapon {
            Some(current) if rate > 0.0 => current.follow(&target, rate, dt),
            _ => target,
        });
    }

    pub fn hands(&self) -> &[HandResult] {
        &self.hands
    }

    pub fn hand_status(&self) -> HandStatus {
        self.aggregate.combined
    }

    pub fn blink_detector(&self) -> &BlinkDetector {
        &self.blink
    }

    pub fn mesh_vertices(&self) -> Option<&[Vector3<f32>]> {
        self.mesh_vertices.as_deref()
    }

    /// Unsmoothed projection of a face, for debug markers
    pub fn project_raw(&self, face: &FaceObservation) -> Vec<Vector3<f32>> {
        self.mesh.project_raw(face)
    }

    pub fn weapon(&self) -> Option<WeaponPose> {
        self.weapon
    }

    pub fn text(&self, channel: TextChannel) -> &str {
        self.text.text(channel)
    }

    /// Forget all tracking state; queued frames are discarded
    pub fn reset(&mut self) {
        self.queue.drain();
        self.blink.reset();
        self.mesh.reset();
        for filter in self.filters.iter_mut().flatten() {
            filter.reset();
        }
        self.hand_clock = StreamClock::default();
        self.face_clock = StreamClock::default();
        self.hands.clear();
        self.aggregate = HandAggregate::default();
        self.mesh_vertices = None;
        self.weapon_target = None;
        self.weapon = None;
        self.text = DebugText::new();
    }
}
