//! Smoothing module - temporal filters applied before mapping
//!
//! Re-exports only. All logic in submodules.

mod one_euro;

pub use one_euro::{HandFilter, OneEuroFilter, OneEuroParams};
