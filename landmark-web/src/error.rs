//! Error types shared by every processing stage

use thiserror::Error;

/// Errors raised while validating or processing a landmark frame
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackingError {
    /// Observation has the wrong number of landmarks for its kind
    #[error("invalid observation: expected {expected} landmarks, got {actual}")]
    InvalidObservation { expected: usize, actual: usize },

    /// A landmark coordinate is NaN or infinite
    #[error("invalid observation: landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },

    /// Flat coordinate array is not made of whole `[x, y, z]` triples
    #[error("flat landmark array of {len} floats is not a multiple of 3")]
    MalformedFlat { len: usize },

    /// A vector was too short to normalize or two axes were parallel
    #[error("degenerate geometry: vector length below epsilon")]
    DegenerateGeometry,

    /// Face landmarks or mesh topology do not match the canonical 468 vertices
    #[error("landmark count mismatch: expected {expected}, got {actual}")]
    LandmarkCountMismatch { expected: usize, actual: usize },

    /// Dispatch queue is at capacity
    #[error("dispatch queue full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type TrackingResult<T> = Result<T, TrackingError>;

impl From<serde_json::Error> for TrackingError {
    fn from(err: serde_json::Error) -> Self {
        TrackingError::Config(err.to_string())
    }
}

impl From<TrackingError> for wasm_bindgen::JsValue {
    fn from(err: TrackingError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
