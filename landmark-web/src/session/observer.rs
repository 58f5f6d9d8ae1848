//! Injected event sink for session diagnostics
//!
//! Processing modules never log; the session reports what happened to a
//! `TrackingObserver` and the host decides where it goes.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::TrackingError;
use crate::face::BlinkTransition;
use crate::gesture::HandStatus;
use crate::landmarks::Handedness;

#[derive(Clone, Debug, PartialEq)]
pub enum TrackingEvent {
    /// Frame failed validation; previous outputs are held
    FrameRejected { timestamp: u64, error: TrackingError },
    /// Frame arrived with a timestamp older than the last processed one
    OutOfOrder { timestamp: u64, last: u64 },
    /// Producer push refused because the queue was full
    FrameDropped { capacity: usize },
    Blink(BlinkTransition),
    Hands { count: usize, total_extended: usize, status: HandStatus },
    /// Weapon basis fell back to default axes
    DegenerateWeapon { handedness: Handedness },
}

impl fmt::Display for TrackingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingEvent::FrameRejected { timestamp, error } => {
                write!(f, "frame {} rejected: {}", timestamp, error)
            }
            TrackingEvent::OutOfOrder { timestamp, last } => {
                write!(f, "frame {} is older than {}, dropped", timestamp, last)
            }
            TrackingEvent::FrameDropped { capacity } => {
                write!(f, "frame dropped, queue full ({})", capacity)
            }
            TrackingEvent::Blink(transition) => f.write_str(transition.message()),
            TrackingEvent::Hands { count, total_extended, status } => write!(
                f,
                "{} hand(s), {} finger(s) up: {}",
                count,
                total_extended,
                status.message()
            ),
            TrackingEvent::DegenerateWeapon { handedness } => {
                write!(f, "{} hand weapon basis degenerate", handedness.as_str())
            }
        }
    }
}

pub trait TrackingObserver {
    fn on_event(&mut self, event: &TrackingEvent);
}

/// Discards every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl TrackingObserver for NullObserver {
    fn on_event(&mut self, _event: &TrackingEvent) {}
}

/// Forwards events to `tracing` with structured fields
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl TrackingObserver for TracingObserver {
    fn on_event(&mut self, event: &TrackingEvent) {
        match event {
            TrackingEvent::FrameRejected { timestamp, error } => {
                warn!(timestamp, %error, "frame rejected");
            }
            TrackingEvent::OutOfOrder { timestamp, last } => {
                warn!(timestamp, last, "out-of-order frame dropped");
            }
            TrackingEvent::FrameDropped { capacity } => {
                warn!(capacity, "dispatch queue full, frame dropped");
            }
            TrackingEvent::Blink(transition) => {
                info!(transition = ?transition, "{}", transition.message());
            }
            TrackingEvent::Hands { count, total_extended, status } => {
                debug!(count, total_extended, status = ?status, "hands updated");
            }
            TrackingEvent::DegenerateWeapon { handedness } => {
                debug!(handedness = handedness.as_str(), "weapon basis fell back to defaults");
            }
        }
    }
}

/// Writes events to the browser console
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleObserver;

#[cfg(target_arch = "wasm32")]
impl TrackingObserver for ConsoleObserver {
    fn on_event(&mut self, event: &TrackingEvent) {
        let text = event.to_string();
        match event {
            TrackingEvent::FrameRejected { .. }
            | TrackingEvent::OutOfOrder { .. }
            | TrackingEvent::FrameDropped { .. } => web_sys::console::warn_1(&text.into()),
            TrackingEvent::Hands { .. } => {}
            _ => web_sys::console::log_1(&text.into()),
        }
    }
}

/// Keeps every event; clones share one log
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<TrackingEvent>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl TrackingObserver for RecordingObserver {
    fn on_event(&mut self, event: &TrackingEvent) {
        self.events.lock().push(event.clone());
    }
}
