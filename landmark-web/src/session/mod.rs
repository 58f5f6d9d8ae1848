//! Session module - queued frames, per-entity state, UI text, diagnostics
//!
//! Re-exports only. All logic in submodules.

mod debug_text;
mod dispatch;
mod observer;
mod pipeline;

pub use debug_text::{DebugText, TextChannel};
pub use dispatch::{DispatchHandle, DispatchQueue};
#[cfg(target_arch = "wasm32")]
pub use observer::ConsoleObserver;
pub use observer::{NullObserver, RecordingObserver, TracingObserver, TrackingEvent, TrackingObserver};
pub use pipeline::{HandResult, TickOutput, TrackingSession};
