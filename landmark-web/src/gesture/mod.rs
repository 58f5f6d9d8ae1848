//! Gesture module - finger states and multi-hand summaries
//!
//! Re-exports only. All logic in submodules.

mod aggregate;
mod fingers;

pub use aggregate::{aggregate, count_message, finger_status_message, HandAggregate, HandStatus};
pub use fingers::{classify, classify_with, Finger, FingerReference, FingerState};
